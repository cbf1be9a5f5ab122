mod common;

use common::Fixture;
use orar::modules::events::service::EventService;
use orar::modules::events::workflow::Action;
use orar_core::{AppError, ErrorKind};
use orar_models::events::{Event, RejectEventDto};
use orar_models::ids::EventId;
use orar_models::schedule::EventStatus;
use orar_models::users::{Principal, UserRole};

fn reason(text: &str) -> RejectEventDto {
    RejectEventDto {
        reason: text.to_string(),
    }
}

async fn perform(
    fx: &Fixture,
    action: Action,
    actor: &Principal,
    id: EventId,
) -> Result<Event, AppError> {
    let store = fx.store.as_ref();
    match action {
        Action::Submit => EventService::submit_event(store, actor, id).await,
        Action::Approve => EventService::approve_event(store, actor, id).await,
        Action::Reject => EventService::reject_event(store, actor, id, reason("Overlaps")).await,
        Action::Publish => EventService::publish_event(store, actor, id).await,
    }
}

/// Drives a fresh draft into `status` through the legal transitions.
async fn event_in(fx: &Fixture, status: EventStatus) -> EventId {
    let id = fx.create_draft().await.event.id;
    let store = fx.store.as_ref();
    match status {
        EventStatus::Draft => {}
        EventStatus::PendingApproval => {
            EventService::submit_event(store, &fx.as_professor(), id).await.unwrap();
        }
        EventStatus::Approved => {
            EventService::submit_event(store, &fx.as_professor(), id).await.unwrap();
            EventService::approve_event(store, &fx.as_secretary(), id).await.unwrap();
        }
        EventStatus::Rejected => {
            EventService::submit_event(store, &fx.as_professor(), id).await.unwrap();
            EventService::reject_event(store, &fx.as_secretary(), id, reason("Room taken"))
                .await
                .unwrap();
        }
        EventStatus::Published => {
            EventService::publish_event(store, &fx.as_admin(), id).await.unwrap();
        }
    }
    id
}

fn expected_target(status: EventStatus, action: Action, role: UserRole) -> Option<EventStatus> {
    use EventStatus::*;
    use UserRole::*;
    let staff = matches!(role, Secretar | Admin);
    match (action, status) {
        (Action::Submit, Draft | Rejected) if role == Profesor => Some(PendingApproval),
        (Action::Approve, PendingApproval) if staff => Some(Approved),
        (Action::Reject, PendingApproval | Approved) if staff => Some(Rejected),
        (Action::Publish, PendingApproval | Approved) if staff => Some(Published),
        (Action::Publish, Draft | Rejected) if role == Admin => Some(Published),
        _ => None,
    }
}

fn principal_for(fx: &Fixture, role: UserRole) -> Principal {
    match role {
        UserRole::Admin => fx.as_admin(),
        UserRole::Secretar => fx.as_secretary(),
        UserRole::Profesor => fx.as_professor(),
        UserRole::Student => fx.as_student(),
    }
}

#[tokio::test]
async fn test_every_action_follows_the_transition_table() {
    let fx = Fixture::new().await;

    for status in EventStatus::ALL {
        for action in Action::ALL {
            for role in UserRole::ALL {
                let id = event_in(&fx, status).await;
                let actor = principal_for(&fx, role);
                let result = perform(&fx, action, &actor, id).await;

                match expected_target(status, action, role) {
                    Some(to) => {
                        let event = result.unwrap_or_else(|e| {
                            panic!("{action} by {role} from {status} failed: {e}")
                        });
                        assert_eq!(event.status, to, "{action} by {role} from {status}");
                    }
                    None => {
                        let err = result.expect_err("transition should be refused");
                        assert!(
                            matches!(err.kind, ErrorKind::Forbidden | ErrorKind::InvalidState),
                            "{action} by {role} from {status}: {err}"
                        );
                        let after = EventService::get_event(fx.store.as_ref(), &fx.as_admin(), id)
                            .await
                            .unwrap();
                        assert_eq!(after.event.status, status);
                    }
                }
            }
        }
    }
}

#[tokio::test]
async fn test_submit_approve_publish_stamps() {
    let fx = Fixture::new().await;
    let id = fx.create_draft().await.event.id;
    let store = fx.store.as_ref();

    let pending = EventService::submit_event(store, &fx.as_professor(), id)
        .await
        .unwrap();
    assert_eq!(pending.status, EventStatus::PendingApproval);
    assert!(pending.approved_by_id.is_none());

    let approved = EventService::approve_event(store, &fx.as_secretary(), id)
        .await
        .unwrap();
    assert_eq!(approved.status, EventStatus::Approved);
    assert_eq!(approved.approved_by_id, Some(fx.secretary.id));
    assert!(approved.approved_at.is_some());
    assert!(approved.published_at.is_none());

    let published = EventService::publish_event(store, &fx.as_admin(), id)
        .await
        .unwrap();
    assert_eq!(published.status, EventStatus::Published);
    assert_eq!(published.approved_by_id, Some(fx.secretary.id));
    assert_eq!(published.approved_at, approved.approved_at);
    assert_eq!(published.published_by_id, Some(fx.admin.id));
    assert!(published.published_at.is_some());
}

#[tokio::test]
async fn test_publishing_pending_event_backfills_approval() {
    let fx = Fixture::new().await;
    let id = event_in(&fx, EventStatus::PendingApproval).await;

    let published = EventService::publish_event(fx.store.as_ref(), &fx.as_secretary(), id)
        .await
        .unwrap();

    assert_eq!(published.status, EventStatus::Published);
    assert_eq!(published.approved_by_id, Some(fx.secretary.id));
    assert_eq!(published.published_by_id, Some(fx.secretary.id));
    assert_eq!(published.approved_at, published.published_at);
}

#[tokio::test]
async fn test_admin_publishes_draft_directly() {
    let fx = Fixture::new().await;
    let id = fx.create_draft().await.event.id;

    let published = EventService::publish_event(fx.store.as_ref(), &fx.as_admin(), id)
        .await
        .unwrap();
    assert_eq!(published.status, EventStatus::Published);
    assert_eq!(published.approved_by_id, Some(fx.admin.id));
}

#[tokio::test]
async fn test_secretary_cannot_publish_draft() {
    let fx = Fixture::new().await;
    let id = fx.create_draft().await.event.id;

    let err = EventService::publish_event(fx.store.as_ref(), &fx.as_secretary(), id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    assert_eq!(err.current_status(), Some("DRAFT"));
}

#[tokio::test]
async fn test_publishing_twice_reports_already_published() {
    let fx = Fixture::new().await;
    let id = event_in(&fx, EventStatus::Published).await;
    let before = EventService::get_event(fx.store.as_ref(), &fx.as_admin(), id).await.unwrap();

    let err = EventService::publish_event(fx.store.as_ref(), &fx.as_admin(), id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    assert!(err.error.to_string().contains("already published"));

    let after = EventService::get_event(fx.store.as_ref(), &fx.as_admin(), id).await.unwrap();
    assert_eq!(after.event.published_at, before.event.published_at);
}

#[tokio::test]
async fn test_reject_records_reason_and_resubmit_clears_it() {
    let fx = Fixture::new().await;
    let id = event_in(&fx, EventStatus::Approved).await;
    let store = fx.store.as_ref();

    let rejected = EventService::reject_event(store, &fx.as_admin(), id, reason("  Room C112 is booked  "))
        .await
        .unwrap();
    assert_eq!(rejected.status, EventStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Room C112 is booked"));
    assert_eq!(rejected.approved_by_id, Some(fx.secretary.id));

    let resubmitted = EventService::submit_event(store, &fx.as_professor(), id)
        .await
        .unwrap();
    assert_eq!(resubmitted.status, EventStatus::PendingApproval);
    assert!(resubmitted.rejection_reason.is_none());
}

#[tokio::test]
async fn test_reject_requires_a_reason() {
    let fx = Fixture::new().await;
    let id = event_in(&fx, EventStatus::PendingApproval).await;

    let err = EventService::reject_event(fx.store.as_ref(), &fx.as_secretary(), id, reason("   "))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let after = EventService::get_event(fx.store.as_ref(), &fx.as_admin(), id).await.unwrap();
    assert_eq!(after.event.status, EventStatus::PendingApproval);
}

#[tokio::test]
async fn test_only_the_owning_teacher_submits() {
    let fx = Fixture::new().await;
    let id = fx.create_draft().await.event.id;

    let err = EventService::submit_event(fx.store.as_ref(), &fx.as_colleague(), id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let after = EventService::get_event(fx.store.as_ref(), &fx.as_admin(), id).await.unwrap();
    assert_eq!(after.event.status, EventStatus::Draft);
}

#[tokio::test]
async fn test_teacher_profile_matched_by_email() {
    let fx = Fixture::new().await;

    let mut dto = fx.event_dto(&[2]);
    dto.teacher_id = fx.colleague_teacher.id;
    let event = EventService::create_event(fx.store.as_ref(), &fx.as_colleague(), dto)
        .await
        .unwrap();

    let pending = EventService::submit_event(fx.store.as_ref(), &fx.as_colleague(), event.event.id)
        .await
        .unwrap();
    assert_eq!(pending.status, EventStatus::PendingApproval);
}

#[tokio::test]
async fn test_unknown_event_is_not_found() {
    let fx = Fixture::new().await;

    let err = EventService::approve_event(fx.store.as_ref(), &fx.as_secretary(), EventId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_reapproval_keeps_the_first_approval() {
    let fx = Fixture::new().await;
    let id = event_in(&fx, EventStatus::Approved).await;
    let store = fx.store.as_ref();
    let first = EventService::get_event(store, &fx.as_admin(), id).await.unwrap();

    EventService::reject_event(store, &fx.as_secretary(), id, reason("Wrong room"))
        .await
        .unwrap();
    EventService::submit_event(store, &fx.as_professor(), id)
        .await
        .unwrap();
    let reapproved = EventService::approve_event(store, &fx.as_admin(), id)
        .await
        .unwrap();

    assert_eq!(reapproved.status, EventStatus::Approved);
    assert_eq!(reapproved.approved_by_id, Some(fx.secretary.id));
    assert_eq!(reapproved.approved_at, first.event.approved_at);
}
