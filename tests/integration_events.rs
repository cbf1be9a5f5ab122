mod common;

use common::Fixture;
use orar::modules::events::service::EventService;
use orar_core::ErrorKind;
use orar_models::events::{EventFilterParams, MoveEventDto};
use orar_models::hour::HourOfDay;
use orar_models::ids::{ClassroomId, EventId, GroupId, TeacherId};
use orar_models::schedule::{Day, EventStatus};
use orar_models::users::UserRole;

fn hour(h: u8) -> HourOfDay {
    HourOfDay::new(h).unwrap()
}

#[tokio::test]
async fn test_create_event_defaults_to_draft() {
    let fx = Fixture::new().await;

    let created = EventService::create_event(
        fx.store.as_ref(),
        &fx.as_professor(),
        fx.event_dto(&[0, 1]),
    )
    .await
    .unwrap();

    assert_eq!(created.event.status, EventStatus::Draft);
    assert_eq!(created.event.start_hour, hour(10));
    assert_eq!(created.event.end_hour, hour(12));
    assert_eq!(created.event.created_by_id, Some(fx.professor.id));
    assert_eq!(created.group_ids, vec![fx.groups[0].id, fx.groups[1].id]);
    assert!(created.event.approved_by_id.is_none());
    assert!(created.event.published_at.is_none());

    let fetched = EventService::get_event(fx.store.as_ref(), &fx.as_admin(), created.event.id)
        .await
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_event_requires_a_group() {
    let fx = Fixture::new().await;

    let mut dto = fx.event_dto(&[]);
    let err = EventService::create_event(fx.store.as_ref(), &fx.as_professor(), dto.clone())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(!err.field_messages("group_ids").is_empty());

    dto.group_ids = vec!["".to_string(), "   ".to_string()];
    let err = EventService::create_event(fx.store.as_ref(), &fx.as_professor(), dto)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    assert_eq!(fx.store.event_count(), 0);
}

#[tokio::test]
async fn test_create_event_ignores_blank_and_duplicate_groups() {
    let fx = Fixture::new().await;

    let mut dto = fx.event_dto(&[1]);
    dto.group_ids.push(" ".to_string());
    dto.group_ids.push(format!(" {} ", fx.groups[1].id));

    let created = EventService::create_event(fx.store.as_ref(), &fx.as_professor(), dto)
        .await
        .unwrap();
    assert_eq!(created.group_ids, vec![fx.groups[1].id]);
}

#[tokio::test]
async fn test_create_event_reports_every_unknown_reference() {
    let fx = Fixture::new().await;

    let mut dto = fx.event_dto(&[0]);
    dto.teacher_id = TeacherId::new();
    dto.classroom_id = ClassroomId::new();
    dto.group_ids.push(GroupId::new().to_string());

    let err = EventService::create_event(fx.store.as_ref(), &fx.as_professor(), dto)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(!err.field_messages("teacher_id").is_empty());
    assert!(!err.field_messages("classroom_id").is_empty());
    assert!(err.field_messages("group_ids")[0].starts_with("Unknown groups"));
    assert!(err.field_messages("discipline_id").is_empty());
    assert_eq!(fx.store.event_count(), 0);
}

#[tokio::test]
async fn test_create_event_rejects_inverted_hours() {
    let fx = Fixture::new().await;

    let mut dto = fx.event_dto(&[0]);
    dto.start_hour = "12:00".to_string();
    dto.end_hour = "12:00".to_string();

    let err = EventService::create_event(fx.store.as_ref(), &fx.as_professor(), dto)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(!err.field_messages("end_hour").is_empty());
}

#[tokio::test]
async fn test_create_event_initial_status_rules() {
    let fx = Fixture::new().await;

    let mut dto = fx.event_dto(&[0]);
    dto.status = Some(EventStatus::PendingApproval);

    let err = EventService::create_event(fx.store.as_ref(), &fx.as_secretary(), dto.clone())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let created = EventService::create_event(fx.store.as_ref(), &fx.as_admin(), dto.clone())
        .await
        .unwrap();
    assert_eq!(created.event.status, EventStatus::PendingApproval);

    dto.status = Some(EventStatus::Published);
    let err = EventService::create_event(fx.store.as_ref(), &fx.as_admin(), dto)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(!err.field_messages("status").is_empty());
}

#[tokio::test]
async fn test_update_replaces_group_set_and_keeps_status() {
    let fx = Fixture::new().await;
    let draft = fx.create_draft().await;
    let submitted = EventService::submit_event(fx.store.as_ref(), &fx.as_professor(), draft.event.id)
        .await
        .unwrap();
    assert_eq!(submitted.status, EventStatus::PendingApproval);

    let mut dto = fx.update_dto(&[1, 2]);
    dto.day = Day::Miercuri;
    dto.start_hour = "08:00".to_string();
    dto.end_hour = "11:00".to_string();

    let updated = EventService::update_event(fx.store.as_ref(), &fx.as_secretary(), draft.event.id, dto)
        .await
        .unwrap();

    assert_eq!(updated.group_ids, vec![fx.groups[1].id, fx.groups[2].id]);
    assert_eq!(updated.event.day, Day::Miercuri);
    assert_eq!(updated.event.duration_hours(), Some(3));
    assert_eq!(updated.event.status, EventStatus::PendingApproval);
    assert_eq!(updated.event.updated_by_id, Some(fx.secretary.id));
}

#[tokio::test]
async fn test_failed_update_leaves_event_untouched() {
    let fx = Fixture::new().await;
    let draft = fx.create_draft().await;

    let mut dto = fx.update_dto(&[1]);
    dto.group_ids.push(GroupId::new().to_string());
    let err = EventService::update_event(fx.store.as_ref(), &fx.as_admin(), draft.event.id, dto)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let after = EventService::get_event(fx.store.as_ref(), &fx.as_admin(), draft.event.id)
        .await
        .unwrap();
    assert_eq!(after, draft);
}

#[tokio::test]
async fn test_published_event_is_locked_except_for_admin() {
    let fx = Fixture::new().await;
    let draft = fx.create_draft().await;
    EventService::publish_event(fx.store.as_ref(), &fx.as_admin(), draft.event.id)
        .await
        .unwrap();

    let err = EventService::update_event(
        fx.store.as_ref(),
        &fx.as_secretary(),
        draft.event.id,
        fx.update_dto(&[2]),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    assert_eq!(err.current_status(), Some("PUBLISHED"));

    let updated = EventService::update_event(
        fx.store.as_ref(),
        &fx.as_admin(),
        draft.event.id,
        fx.update_dto(&[2]),
    )
    .await
    .unwrap();
    assert_eq!(updated.group_ids, vec![fx.groups[2].id]);
    assert_eq!(updated.event.status, EventStatus::Published);
}

#[tokio::test]
async fn test_update_unknown_event_is_not_found() {
    let fx = Fixture::new().await;

    let err = EventService::update_event(
        fx.store.as_ref(),
        &fx.as_admin(),
        EventId::new(),
        fx.update_dto(&[0]),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_move_keeps_duration_and_status() {
    let fx = Fixture::new().await;
    let draft = fx.create_draft().await;

    let moved = EventService::move_event(
        fx.store.as_ref(),
        &fx.as_professor(),
        draft.event.id,
        MoveEventDto {
            day: Day::Joi,
            start_hour: "14:00".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(moved.day, Day::Joi);
    assert_eq!(moved.start_hour, hour(14));
    assert_eq!(moved.end_hour, hour(16));
    assert_eq!(moved.status, EventStatus::Draft);

    let fetched = EventService::get_event(fx.store.as_ref(), &fx.as_admin(), draft.event.id)
        .await
        .unwrap();
    assert_eq!(fetched.group_ids, draft.group_ids);
}

#[tokio::test]
async fn test_move_past_end_of_day_is_rejected() {
    let fx = Fixture::new().await;
    let draft = fx.create_draft().await;

    let err = EventService::move_event(
        fx.store.as_ref(),
        &fx.as_professor(),
        draft.event.id,
        MoveEventDto {
            day: Day::Vineri,
            start_hour: "22:00".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(!err.field_messages("start_hour").is_empty());

    let after = EventService::get_event(fx.store.as_ref(), &fx.as_admin(), draft.event.id)
        .await
        .unwrap();
    assert_eq!(after.event.day, Day::Luni);
    assert_eq!(after.event.start_hour, hour(10));
}

#[tokio::test]
async fn test_move_unknown_event_is_not_found() {
    let fx = Fixture::new().await;

    let err = EventService::move_event(
        fx.store.as_ref(),
        &fx.as_admin(),
        EventId::new(),
        MoveEventDto {
            day: Day::Luni,
            start_hour: "09:00".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_removes_event() {
    let fx = Fixture::new().await;
    let draft = fx.create_draft().await;

    EventService::delete_event(fx.store.as_ref(), draft.event.id)
        .await
        .unwrap();
    assert_eq!(fx.store.event_count(), 0);

    let err = EventService::get_event(fx.store.as_ref(), &fx.as_admin(), draft.event.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = EventService::delete_event(fx.store.as_ref(), draft.event.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_list_filters_and_orders_by_slot() {
    let fx = Fixture::new().await;
    let professor = fx.as_professor();

    let mut friday = fx.event_dto(&[1]);
    friday.day = Day::Vineri;
    EventService::create_event(fx.store.as_ref(), &professor, friday)
        .await
        .unwrap();

    let mut early = fx.event_dto(&[0]);
    early.start_hour = "08:00".to_string();
    early.end_hour = "09:00".to_string();
    let early = EventService::create_event(fx.store.as_ref(), &professor, early)
        .await
        .unwrap();

    let late = fx.create_draft().await;

    let all = EventService::list_events(
        fx.store.as_ref(),
        &fx.as_admin(),
        EventFilterParams::default(),
    )
    .await
    .unwrap();
    let days_and_hours: Vec<(Day, u8)> = all
        .iter()
        .map(|e| (e.event.day, e.event.start_hour.hour()))
        .collect();
    assert_eq!(
        days_and_hours,
        vec![(Day::Luni, 8), (Day::Luni, 10), (Day::Vineri, 10)]
    );

    let first_group = EventService::list_events(
        fx.store.as_ref(),
        &fx.as_admin(),
        EventFilterParams {
            group_id: Some(fx.groups[0].id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let ids: Vec<EventId> = first_group.iter().map(|e| e.event.id).collect();
    assert_eq!(ids, vec![early.event.id, late.event.id]);

    EventService::submit_event(fx.store.as_ref(), &professor, late.event.id)
        .await
        .unwrap();
    let pending = EventService::list_events(
        fx.store.as_ref(),
        &fx.as_admin(),
        EventFilterParams {
            status: Some(EventStatus::PendingApproval),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].event.id, late.event.id);
}

#[tokio::test]
async fn test_student_principal_cannot_drive_the_workflow() {
    let fx = Fixture::new().await;
    let draft = fx.create_draft().await;
    assert_eq!(fx.as_student().role, UserRole::Student);

    let err = EventService::submit_event(fx.store.as_ref(), &fx.as_student(), draft.event.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_students_see_only_published_events() {
    let fx = Fixture::new().await;
    let student = fx.as_student();
    let draft = fx.create_draft().await;
    let published = fx.create_draft().await;
    EventService::publish_event(fx.store.as_ref(), &fx.as_admin(), published.event.id)
        .await
        .unwrap();

    let visible = EventService::list_events(
        fx.store.as_ref(),
        &student,
        EventFilterParams::default(),
    )
    .await
    .unwrap();
    let ids: Vec<EventId> = visible.iter().map(|e| e.event.id).collect();
    assert_eq!(ids, vec![published.event.id]);

    let drafts = EventService::list_events(
        fx.store.as_ref(),
        &student,
        EventFilterParams {
            status: Some(EventStatus::Draft),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(drafts.is_empty());

    let err = EventService::get_event(fx.store.as_ref(), &student, draft.event.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let fetched = EventService::get_event(fx.store.as_ref(), &student, published.event.id)
        .await
        .unwrap();
    assert_eq!(fetched.event.status, EventStatus::Published);
}
