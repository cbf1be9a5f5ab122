//! Persistence collaborators.
//!
//! Services never touch a connection pool directly; they receive the
//! repositories below as trait objects. [`postgres::PgStore`] backs the
//! running server and [`memory::InMemoryStore`] backs the test suite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use orar_core::AppError;
use orar_models::calendar::{
    AcademicYear, CalendarNode, Classroom, CreateAcademicYearDto, CreateClassroomDto,
    CreateDisciplineDto, CreateGroupDto, CreateLearningTypeDto, CreateStudyYearDto,
    CreateTeacherDto, Discipline, Group, LearningType, LearningTypeWithStats, StudyYear, Teacher,
};
use orar_models::events::{Event, EventFields, EventFilterParams, EventWithGroups};
use orar_models::ids::{
    AcademicYearId, ClassroomId, DisciplineId, EventId, GroupId, LearningTypeId, NotificationId,
    StudyYearId, TeacherId, UserId,
};
use orar_models::notifications::{NewNotification, Notification};
use orar_models::users::{User, UserRole};
use orar_models::{Day, EventStatus, HourOfDay};

pub mod memory;
pub mod postgres;

/// How a status change treats the approval stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStamp {
    Keep,
    /// Record the acting user only when no approval exists yet. The first
    /// approval wins, even across reject and resubmit.
    Backfill,
}

/// A single compare-and-set status write.
///
/// The store applies it only while the event is still in `from`; a `None`
/// result means the precondition no longer held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub from: EventStatus,
    pub to: EventStatus,
    pub actor: UserId,
    pub at: DateTime<Utc>,
    pub approval: ApprovalStamp,
    pub stamp_publication: bool,
    /// New value of the rejection reason; `None` clears it
    pub rejection_reason: Option<String>,
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Writes the event row and one membership row per group atomically.
    async fn insert_event(
        &self,
        fields: &EventFields,
        status: EventStatus,
        group_ids: &[GroupId],
        actor: UserId,
    ) -> Result<EventWithGroups, AppError>;

    /// Replaces the scalar fields and the full group set atomically.
    async fn replace_event(
        &self,
        id: EventId,
        fields: &EventFields,
        group_ids: &[GroupId],
        actor: UserId,
    ) -> Result<Option<EventWithGroups>, AppError>;

    /// Deletes the event and its memberships; `false` when it did not exist.
    async fn delete_event(&self, id: EventId) -> Result<bool, AppError>;

    async fn find_event(&self, id: EventId) -> Result<Option<EventWithGroups>, AppError>;

    /// Events matching the filter, ordered by day then start hour.
    async fn list_events(&self, filter: &EventFilterParams)
    -> Result<Vec<EventWithGroups>, AppError>;

    /// Rewrites only the time slot.
    async fn move_event(
        &self,
        id: EventId,
        day: Day,
        start_hour: HourOfDay,
        end_hour: HourOfDay,
        actor: UserId,
    ) -> Result<Option<Event>, AppError>;

    async fn apply_status_change(
        &self,
        id: EventId,
        change: &StatusChange,
    ) -> Result<Option<Event>, AppError>;

    /// The teacher's events that are still `DRAFT` or `PENDING_APPROVAL`.
    async fn find_open_events_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Vec<Event>, AppError>;

    /// Moves the listed events that are still `DRAFT` to `PENDING_APPROVAL`
    /// in one statement, returning how many rows changed.
    async fn submit_drafts(&self, ids: &[EventId], actor: UserId) -> Result<u64, AppError>;
}

#[async_trait]
pub trait CalendarRepository: Send + Sync {
    async fn insert_academic_year(
        &self,
        dto: &CreateAcademicYearDto,
        actor: UserId,
    ) -> Result<AcademicYear, AppError>;
    async fn find_academic_year(&self, id: AcademicYearId)
    -> Result<Option<AcademicYear>, AppError>;
    async fn find_academic_year_by_span(
        &self,
        start_year: i32,
        end_year: i32,
    ) -> Result<Option<AcademicYear>, AppError>;

    async fn insert_learning_type(
        &self,
        dto: &CreateLearningTypeDto,
    ) -> Result<LearningType, AppError>;
    async fn find_learning_type(&self, id: LearningTypeId)
    -> Result<Option<LearningType>, AppError>;
    /// Case-insensitive lookup by cycle name.
    async fn find_learning_type_by_cycle(
        &self,
        learning_cycle: &str,
    ) -> Result<Option<LearningType>, AppError>;
    async fn learning_type_stats(
        &self,
        id: LearningTypeId,
    ) -> Result<Option<LearningTypeWithStats>, AppError>;

    async fn insert_study_year(&self, dto: &CreateStudyYearDto) -> Result<StudyYear, AppError>;
    async fn find_study_year(&self, id: StudyYearId) -> Result<Option<StudyYear>, AppError>;
    async fn find_study_year_by_number(
        &self,
        learning_type_id: LearningTypeId,
        year: i16,
    ) -> Result<Option<StudyYear>, AppError>;

    async fn insert_group(&self, dto: &CreateGroupDto) -> Result<Group, AppError>;
    async fn find_group(&self, id: GroupId) -> Result<Option<Group>, AppError>;
    async fn find_groups(&self, ids: &[GroupId]) -> Result<Vec<Group>, AppError>;

    async fn insert_discipline(&self, dto: &CreateDisciplineDto) -> Result<Discipline, AppError>;
    async fn find_discipline(&self, id: DisciplineId) -> Result<Option<Discipline>, AppError>;

    async fn insert_teacher(
        &self,
        dto: &CreateTeacherDto,
        actor: UserId,
    ) -> Result<Teacher, AppError>;
    async fn find_teacher(&self, id: TeacherId) -> Result<Option<Teacher>, AppError>;

    async fn insert_classroom(
        &self,
        dto: &CreateClassroomDto,
        actor: UserId,
    ) -> Result<Classroom, AppError>;
    async fn find_classroom(&self, id: ClassroomId) -> Result<Option<Classroom>, AppError>;

    /// Events referencing the node directly or through its groups and
    /// disciplines.
    async fn count_dependent_events(&self, node: CalendarNode) -> Result<u64, AppError>;

    /// Deletes the node; `false` when it did not exist. Fails with a
    /// conflict while other calendar rows still reference it.
    async fn delete_node(&self, node: CalendarNode) -> Result<bool, AppError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, AppError>;

    /// Newest first.
    async fn list_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError>;

    /// Marks the recipient's notification read; `None` when it is not theirs.
    async fn mark_notification_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<Option<Notification>, AppError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, AppError>;

    async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>, AppError>;

    /// Teacher profile linked to the account, by user id first and by
    /// case-insensitive email otherwise.
    async fn find_teacher_for_user(
        &self,
        user_id: UserId,
        email: &str,
    ) -> Result<Option<Teacher>, AppError>;
}

/// Everything the application needs from persistence.
pub trait ScheduleStore:
    EventRepository + CalendarRepository + NotificationRepository + UserDirectory
{
}

impl<T> ScheduleStore for T where
    T: EventRepository + CalendarRepository + NotificationRepository + UserDirectory
{
}
