use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use orar_core::{ErrorKind, ErrorResponse};
use orar_models::calendar::{
    AcademicYear, Classroom, CreateAcademicYearDto, CreateClassroomDto, CreateDisciplineDto,
    CreateGroupDto, CreateLearningTypeDto, CreateStudyYearDto, CreateTeacherDto, Discipline,
    Group, LearningType, LearningTypeWithStats, StudyYear, Teacher,
};
use orar_models::events::{
    BulkPublishResult, CreateEventDto, Event, EventWithGroups, MoveEventDto, RejectEventDto,
    UpdateEventDto,
};
use orar_models::notifications::{Notification, NotificationPayload};
use orar_models::users::UserRole;
use orar_models::{Day, EventStatus, EventType, Recurrence};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::events::controller::create_event,
        crate::modules::events::controller::list_events,
        crate::modules::events::controller::get_event,
        crate::modules::events::controller::update_event,
        crate::modules::events::controller::delete_event,
        crate::modules::events::controller::move_event,
        crate::modules::events::controller::submit_event,
        crate::modules::events::controller::approve_event,
        crate::modules::events::controller::reject_event,
        crate::modules::events::controller::publish_event,
        crate::modules::events::controller::bulk_publish,
        crate::modules::calendar::controller::create_academic_year,
        crate::modules::calendar::controller::get_academic_year,
        crate::modules::calendar::controller::delete_academic_year,
        crate::modules::calendar::controller::create_learning_type,
        crate::modules::calendar::controller::get_learning_type,
        crate::modules::calendar::controller::get_learning_type_stats,
        crate::modules::calendar::controller::delete_learning_type,
        crate::modules::calendar::controller::create_study_year,
        crate::modules::calendar::controller::get_study_year,
        crate::modules::calendar::controller::delete_study_year,
        crate::modules::calendar::controller::create_group,
        crate::modules::calendar::controller::get_group,
        crate::modules::calendar::controller::delete_group,
        crate::modules::calendar::controller::create_discipline,
        crate::modules::calendar::controller::get_discipline,
        crate::modules::calendar::controller::delete_discipline,
        crate::modules::calendar::controller::create_teacher,
        crate::modules::calendar::controller::get_teacher,
        crate::modules::calendar::controller::delete_teacher,
        crate::modules::calendar::controller::create_classroom,
        crate::modules::calendar::controller::get_classroom,
        crate::modules::calendar::controller::delete_classroom,
        crate::modules::notifications::controller::list_notifications,
        crate::modules::notifications::controller::mark_notification_read,
        crate::modules::notifications::controller::stream_notifications,
    ),
    components(
        schemas(
            ErrorResponse,
            ErrorKind,
            UserRole,
            Day,
            EventType,
            Recurrence,
            EventStatus,
            Event,
            EventWithGroups,
            CreateEventDto,
            UpdateEventDto,
            MoveEventDto,
            RejectEventDto,
            BulkPublishResult,
            AcademicYear,
            CreateAcademicYearDto,
            LearningType,
            LearningTypeWithStats,
            CreateLearningTypeDto,
            StudyYear,
            CreateStudyYearDto,
            Group,
            CreateGroupDto,
            Discipline,
            CreateDisciplineDto,
            Teacher,
            CreateTeacherDto,
            Classroom,
            CreateClassroomDto,
            Notification,
            NotificationPayload,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Events", description = "Schedule events on the weekly grid"),
        (name = "Workflow", description = "Submission, approval and publication of events"),
        (name = "Calendar", description = "Academic years, cycles, study years, groups and resources"),
        (name = "Notifications", description = "Per-user notifications and live stream")
    ),
    info(
        title = "Orar API",
        version = "0.1.0",
        description = "University timetable scheduling with an approval workflow.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
