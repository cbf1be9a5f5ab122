mod common;

use chrono::NaiveDate;
use common::Fixture;
use orar::cli::{SeedReport, seed_calendar};
use orar::modules::calendar::service::CalendarService;
use orar::store::memory::InMemoryStore;
use orar_core::ErrorKind;
use orar_models::calendar::{
    CalendarNode, CreateAcademicYearDto, CreateClassroomDto, CreateGroupDto,
    CreateLearningTypeDto, CreateStudyYearDto,
};
use orar_models::ids::{ClassroomId, LearningTypeId, StudyYearId};
use orar_models::users::{Principal, UserRole};

#[tokio::test]
async fn test_duplicate_academic_year_conflicts() {
    let fx = Fixture::new().await;

    let err = CalendarService::create_academic_year(
        fx.store.as_ref(),
        &fx.as_admin(),
        CreateAcademicYearDto {
            start_year: 2025,
            end_year: 2026,
            published: false,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_academic_year_must_end_after_it_starts() {
    let fx = Fixture::new().await;

    let err = CalendarService::create_academic_year(
        fx.store.as_ref(),
        &fx.as_admin(),
        CreateAcademicYearDto {
            start_year: 2027,
            end_year: 2026,
            published: false,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_learning_cycle_is_unique_ignoring_case_and_padding() {
    let fx = Fixture::new().await;

    let err = CalendarService::create_learning_type(
        fx.store.as_ref(),
        CreateLearningTypeDto {
            learning_cycle: "  licență ".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let master = CalendarService::create_learning_type(
        fx.store.as_ref(),
        CreateLearningTypeDto {
            learning_cycle: " Master ".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(master.learning_cycle, "Master");
}

#[tokio::test]
async fn test_study_year_requires_known_learning_type() {
    let fx = Fixture::new().await;

    let err = CalendarService::create_study_year(
        fx.store.as_ref(),
        CreateStudyYearDto {
            year: 2,
            learning_type_id: LearningTypeId::new(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(!err.field_messages("learning_type_id").is_empty());
}

#[tokio::test]
async fn test_group_must_match_study_year_learning_type() {
    let fx = Fixture::new().await;
    let master = CalendarService::create_learning_type(
        fx.store.as_ref(),
        CreateLearningTypeDto {
            learning_cycle: "Master".to_string(),
        },
    )
    .await
    .unwrap();

    let err = CalendarService::create_group(
        fx.store.as_ref(),
        CreateGroupDto {
            name: "M1".to_string(),
            group_number: 1,
            semester: 1,
            study_year_id: fx.study_year.id,
            learning_type_id: master.id,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = CalendarService::create_group(
        fx.store.as_ref(),
        CreateGroupDto {
            name: "M1".to_string(),
            group_number: 1,
            semester: 1,
            study_year_id: StudyYearId::new(),
            learning_type_id: master.id,
        },
    )
    .await
    .unwrap_err();
    assert!(!err.field_messages("study_year_id").is_empty());
}

#[tokio::test]
async fn test_learning_type_stats_counts_children() {
    let fx = Fixture::new().await;

    let stats = CalendarService::learning_type_stats(fx.store.as_ref(), fx.learning_type.id)
        .await
        .unwrap();
    assert_eq!(stats.learning_type.id, fx.learning_type.id);
    assert_eq!(stats.study_year_count, 1);
    assert_eq!(stats.group_count, 3);
    assert_eq!(stats.discipline_count, 1);

    let err = CalendarService::learning_type_stats(fx.store.as_ref(), LearningTypeId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_blocked_while_events_depend_on_node() {
    let fx = Fixture::new().await;
    fx.create_draft().await;

    for node in [
        CalendarNode::Classroom(fx.classroom.id),
        CalendarNode::Group(fx.groups[0].id),
        CalendarNode::Teacher(fx.teacher.id),
        CalendarNode::AcademicYear(fx.academic_year.id),
        CalendarNode::LearningType(fx.learning_type.id),
    ] {
        let err = CalendarService::delete_node(fx.store.as_ref(), node)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict, "{node}");
    }

    CalendarService::get_classroom(fx.store.as_ref(), fx.classroom.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_unused_node() {
    let fx = Fixture::new().await;
    let spare = CalendarService::create_classroom(
        fx.store.as_ref(),
        &fx.as_secretary(),
        CreateClassroomDto {
            name: "A01".to_string(),
            capacity: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(spare.created_by_id, Some(fx.secretary.id));

    CalendarService::delete_node(fx.store.as_ref(), CalendarNode::Classroom(spare.id))
        .await
        .unwrap();

    let err = CalendarService::get_classroom(fx.store.as_ref(), spare.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = CalendarService::delete_node(fx.store.as_ref(), CalendarNode::Classroom(ClassroomId::new()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // Unused group with no events attached.
    CalendarService::delete_node(fx.store.as_ref(), CalendarNode::Group(fx.groups[2].id))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_refused_while_children_reference_node() {
    let fx = Fixture::new().await;

    let err = CalendarService::delete_node(fx.store.as_ref(), CalendarNode::StudyYear(fx.study_year.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    CalendarService::get_study_year(fx.store.as_ref(), fx.study_year.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_seed_calendar_is_idempotent() {
    let store = InMemoryStore::new();
    let admin = store.add_user("Ana", "Admin", "admin@orar.local", UserRole::Admin);
    let actor = Principal::from(&admin);
    let today = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();

    let first = seed_calendar(&store, &actor, today).await.unwrap();
    assert_eq!(
        first,
        SeedReport {
            academic_years_created: 1,
            learning_types_created: 2,
            study_years_created: 5,
        }
    );

    let second = seed_calendar(&store, &actor, today).await.unwrap();
    assert_eq!(second, SeedReport::default());

    let year = CalendarService::find_academic_year_by_span(&store, 2025, 2026)
        .await
        .unwrap()
        .unwrap();
    assert!(year.published);
}

#[tokio::test]
async fn test_seed_calendar_fills_gaps_only() {
    let fx = Fixture::new().await;
    let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

    let report = seed_calendar(fx.store.as_ref(), &fx.as_admin(), today)
        .await
        .unwrap();

    assert_eq!(
        report,
        SeedReport {
            academic_years_created: 0,
            learning_types_created: 1,
            study_years_created: 4,
        }
    );
}
