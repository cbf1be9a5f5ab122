//! PostgreSQL implementation of the store traits.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

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

use super::{
    ApprovalStamp, CalendarRepository, EventRepository, NotificationRepository, StatusChange,
    UserDirectory,
};

const EVENT_COLUMNS: &str = "id, day, start_hour, end_hour, event_type, event_recurrence, \
     semester, status, rejection_reason, approved_by_id, approved_at, published_by_id, \
     published_at, academic_year_id, learning_type_id, teacher_id, discipline_id, classroom_id, \
     created_by_id, updated_by_id, created_at, updated_at";

const TEACHER_COLUMNS: &str =
    "id, name, email, user_id, created_by_id, updated_by_id, created_at, updated_at";

const USER_COLUMNS: &str = "id, first_name, last_name, email, role, created_at, updated_at";

/// Maps constraint violations onto the error taxonomy.
fn constraint_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default();
        if db_err.is_unique_violation() {
            let message = match constraint {
                "unique_academic_year" => "This academic year already exists",
                "unique_learning_cycle" => "A learning type with this name already exists",
                "unique_study_year_per_learning_type" => {
                    "This study year already exists for the learning type"
                }
                "unique_group_name_per_study_year" => {
                    "A group with this name already exists in the study year"
                }
                "classrooms_name_key" => "A classroom with this name already exists",
                "users_email_key" => "A user with this email already exists",
                _ => "Record already exists",
            };
            return AppError::conflict(anyhow::anyhow!(message));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::conflict(anyhow::anyhow!(
                "Referenced record is missing or still in use ({})",
                constraint
            ));
        }
    }
    AppError::persistence(err)
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates or refreshes a directory user keyed by email.
    pub async fn upsert_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"INSERT INTO users (first_name, last_name, email, role)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (email) DO UPDATE
               SET first_name = EXCLUDED.first_name,
                   last_name = EXCLUDED.last_name,
                   role = EXCLUDED.role,
                   updated_at = NOW()
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn attach_groups(&self, events: Vec<Event>) -> Result<Vec<EventWithGroups>, AppError> {
        let ids: Vec<EventId> = events.iter().map(|e| e.id).collect();
        let rows = sqlx::query_as::<_, (EventId, GroupId)>(
            "SELECT event_id, group_id FROM event_groups WHERE event_id = ANY($1) ORDER BY group_id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut memberships: HashMap<EventId, Vec<GroupId>> = HashMap::new();
        for (event_id, group_id) in rows {
            memberships.entry(event_id).or_default().push(group_id);
        }

        Ok(events
            .into_iter()
            .map(|event| EventWithGroups {
                group_ids: memberships.remove(&event.id).unwrap_or_default(),
                event,
            })
            .collect())
    }
}

#[async_trait]
impl EventRepository for PgStore {
    #[instrument(skip(self, fields))]
    async fn insert_event(
        &self,
        fields: &EventFields,
        status: EventStatus,
        group_ids: &[GroupId],
        actor: UserId,
    ) -> Result<EventWithGroups, AppError> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"INSERT INTO events (day, start_hour, end_hour, event_type, event_recurrence, semester,
                   status, academic_year_id, learning_type_id, teacher_id, discipline_id,
                   classroom_id, created_by_id, updated_by_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
               RETURNING {EVENT_COLUMNS}"#
        ))
        .bind(fields.day)
        .bind(fields.start_hour)
        .bind(fields.end_hour)
        .bind(fields.event_type)
        .bind(fields.event_recurrence)
        .bind(fields.semester)
        .bind(status)
        .bind(fields.academic_year_id)
        .bind(fields.learning_type_id)
        .bind(fields.teacher_id)
        .bind(fields.discipline_id)
        .bind(fields.classroom_id)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await
        .map_err(constraint_error)?;

        sqlx::query(
            "INSERT INTO event_groups (event_id, group_id) SELECT $1, UNNEST($2::uuid[])",
        )
        .bind(event.id)
        .bind(group_ids)
        .execute(&mut *tx)
        .await
        .map_err(constraint_error)?;

        tx.commit().await?;

        Ok(EventWithGroups {
            event,
            group_ids: group_ids.to_vec(),
        })
    }

    #[instrument(skip(self, fields))]
    async fn replace_event(
        &self,
        id: EventId,
        fields: &EventFields,
        group_ids: &[GroupId],
        actor: UserId,
    ) -> Result<Option<EventWithGroups>, AppError> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"UPDATE events
               SET day = $2, start_hour = $3, end_hour = $4, event_type = $5,
                   event_recurrence = $6, semester = $7, academic_year_id = $8,
                   learning_type_id = $9, teacher_id = $10, discipline_id = $11,
                   classroom_id = $12, updated_by_id = $13, updated_at = NOW()
               WHERE id = $1
               RETURNING {EVENT_COLUMNS}"#
        ))
        .bind(id)
        .bind(fields.day)
        .bind(fields.start_hour)
        .bind(fields.end_hour)
        .bind(fields.event_type)
        .bind(fields.event_recurrence)
        .bind(fields.semester)
        .bind(fields.academic_year_id)
        .bind(fields.learning_type_id)
        .bind(fields.teacher_id)
        .bind(fields.discipline_id)
        .bind(fields.classroom_id)
        .bind(actor)
        .fetch_optional(&mut *tx)
        .await
        .map_err(constraint_error)?;

        let Some(event) = event else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM event_groups WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO event_groups (event_id, group_id) SELECT $1, UNNEST($2::uuid[])",
        )
        .bind(id)
        .bind(group_ids)
        .execute(&mut *tx)
        .await
        .map_err(constraint_error)?;

        tx.commit().await?;

        Ok(Some(EventWithGroups {
            event,
            group_ids: group_ids.to_vec(),
        }))
    }

    async fn delete_event(&self, id: EventId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_event(&self, id: EventId) -> Result<Option<EventWithGroups>, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match event {
            Some(event) => Ok(self.attach_groups(vec![event]).await?.pop()),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn list_events(
        &self,
        filter: &EventFilterParams,
    ) -> Result<Vec<EventWithGroups>, AppError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"SELECT {EVENT_COLUMNS} FROM events e
               WHERE ($1::uuid IS NULL OR e.teacher_id = $1)
                 AND ($2::event_status IS NULL OR e.status = $2)
                 AND ($3::uuid IS NULL OR EXISTS (
                        SELECT 1 FROM event_groups eg
                        WHERE eg.event_id = e.id AND eg.group_id = $3))
                 AND ($4::uuid IS NULL OR e.academic_year_id = $4)
                 AND ($5::smallint IS NULL OR e.semester = $5)
                 AND ($6::week_day IS NULL OR e.day = $6)
               ORDER BY e.day, e.start_hour, e.created_at"#
        ))
        .bind(filter.teacher_id)
        .bind(filter.status)
        .bind(filter.group_id)
        .bind(filter.academic_year_id)
        .bind(filter.semester)
        .bind(filter.day)
        .fetch_all(&self.pool)
        .await?;

        self.attach_groups(events).await
    }

    async fn move_event(
        &self,
        id: EventId,
        day: Day,
        start_hour: HourOfDay,
        end_hour: HourOfDay,
        actor: UserId,
    ) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"UPDATE events
               SET day = $2, start_hour = $3, end_hour = $4, updated_by_id = $5, updated_at = NOW()
               WHERE id = $1
               RETURNING {EVENT_COLUMNS}"#
        ))
        .bind(id)
        .bind(day)
        .bind(start_hour)
        .bind(end_hour)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    #[instrument(skip(self))]
    async fn apply_status_change(
        &self,
        id: EventId,
        change: &StatusChange,
    ) -> Result<Option<Event>, AppError> {
        let backfill_approval = change.approval == ApprovalStamp::Backfill;

        // SET expressions see the row as it was before the update
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"UPDATE events
               SET status = $3,
                   rejection_reason = $4,
                   approved_by_id = CASE
                       WHEN $5 AND approved_at IS NULL THEN $6 ELSE approved_by_id END,
                   approved_at = CASE
                       WHEN $5 AND approved_at IS NULL THEN $7 ELSE approved_at END,
                   published_by_id = CASE WHEN $8 THEN $6 ELSE published_by_id END,
                   published_at = CASE WHEN $8 THEN $7 ELSE published_at END,
                   updated_by_id = $6,
                   updated_at = $7
               WHERE id = $1 AND status = $2
               RETURNING {EVENT_COLUMNS}"#
        ))
        .bind(id)
        .bind(change.from)
        .bind(change.to)
        .bind(change.rejection_reason.as_deref())
        .bind(backfill_approval)
        .bind(change.actor)
        .bind(change.at)
        .bind(change.stamp_publication)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn find_open_events_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"SELECT {EVENT_COLUMNS} FROM events
               WHERE teacher_id = $1 AND status IN ('DRAFT', 'PENDING_APPROVAL')
               ORDER BY day, start_hour"#
        ))
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    #[instrument(skip(self, ids), fields(candidates = ids.len()))]
    async fn submit_drafts(&self, ids: &[EventId], actor: UserId) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"UPDATE events
               SET status = 'PENDING_APPROVAL', updated_by_id = $2, updated_at = NOW()
               WHERE id = ANY($1) AND status = 'DRAFT'"#,
        )
        .bind(ids)
        .bind(actor)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CalendarRepository for PgStore {
    async fn insert_academic_year(
        &self,
        dto: &CreateAcademicYearDto,
        actor: UserId,
    ) -> Result<AcademicYear, AppError> {
        sqlx::query_as::<_, AcademicYear>(
            r#"INSERT INTO academic_years (start_year, end_year, published, created_by_id, updated_by_id)
               VALUES ($1, $2, $3, $4, $4)
               RETURNING id, start_year, end_year, published, created_by_id, updated_by_id, created_at, updated_at"#,
        )
        .bind(dto.start_year)
        .bind(dto.end_year)
        .bind(dto.published)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_error)
    }

    async fn find_academic_year(
        &self,
        id: AcademicYearId,
    ) -> Result<Option<AcademicYear>, AppError> {
        let year = sqlx::query_as::<_, AcademicYear>(
            r#"SELECT id, start_year, end_year, published, created_by_id, updated_by_id, created_at, updated_at
               FROM academic_years WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(year)
    }

    async fn find_academic_year_by_span(
        &self,
        start_year: i32,
        end_year: i32,
    ) -> Result<Option<AcademicYear>, AppError> {
        let year = sqlx::query_as::<_, AcademicYear>(
            r#"SELECT id, start_year, end_year, published, created_by_id, updated_by_id, created_at, updated_at
               FROM academic_years WHERE start_year = $1 AND end_year = $2"#,
        )
        .bind(start_year)
        .bind(end_year)
        .fetch_optional(&self.pool)
        .await?;
        Ok(year)
    }

    async fn insert_learning_type(
        &self,
        dto: &CreateLearningTypeDto,
    ) -> Result<LearningType, AppError> {
        sqlx::query_as::<_, LearningType>(
            r#"INSERT INTO learning_types (learning_cycle) VALUES ($1)
               RETURNING id, learning_cycle, created_at, updated_at"#,
        )
        .bind(dto.learning_cycle.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_error)
    }

    async fn find_learning_type(
        &self,
        id: LearningTypeId,
    ) -> Result<Option<LearningType>, AppError> {
        let learning_type = sqlx::query_as::<_, LearningType>(
            "SELECT id, learning_cycle, created_at, updated_at FROM learning_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(learning_type)
    }

    async fn find_learning_type_by_cycle(
        &self,
        learning_cycle: &str,
    ) -> Result<Option<LearningType>, AppError> {
        let learning_type = sqlx::query_as::<_, LearningType>(
            r#"SELECT id, learning_cycle, created_at, updated_at FROM learning_types
               WHERE LOWER(learning_cycle) = LOWER($1)"#,
        )
        .bind(learning_cycle.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(learning_type)
    }

    async fn learning_type_stats(
        &self,
        id: LearningTypeId,
    ) -> Result<Option<LearningTypeWithStats>, AppError> {
        let Some(learning_type) = self.find_learning_type(id).await? else {
            return Ok(None);
        };

        let (study_year_count, group_count, discipline_count) =
            sqlx::query_as::<_, (i64, i64, i64)>(
                r#"SELECT
                       (SELECT COUNT(*) FROM study_years WHERE learning_type_id = $1),
                       (SELECT COUNT(*) FROM groups WHERE learning_type_id = $1),
                       (SELECT COUNT(*) FROM disciplines WHERE learning_type_id = $1)"#,
            )
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(Some(LearningTypeWithStats {
            learning_type,
            study_year_count,
            group_count,
            discipline_count,
        }))
    }

    async fn insert_study_year(&self, dto: &CreateStudyYearDto) -> Result<StudyYear, AppError> {
        sqlx::query_as::<_, StudyYear>(
            r#"INSERT INTO study_years (year, learning_type_id) VALUES ($1, $2)
               RETURNING id, year, learning_type_id, created_at, updated_at"#,
        )
        .bind(dto.year)
        .bind(dto.learning_type_id)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_error)
    }

    async fn find_study_year(&self, id: StudyYearId) -> Result<Option<StudyYear>, AppError> {
        let study_year = sqlx::query_as::<_, StudyYear>(
            "SELECT id, year, learning_type_id, created_at, updated_at FROM study_years WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(study_year)
    }

    async fn find_study_year_by_number(
        &self,
        learning_type_id: LearningTypeId,
        year: i16,
    ) -> Result<Option<StudyYear>, AppError> {
        let study_year = sqlx::query_as::<_, StudyYear>(
            r#"SELECT id, year, learning_type_id, created_at, updated_at FROM study_years
               WHERE learning_type_id = $1 AND year = $2"#,
        )
        .bind(learning_type_id)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;
        Ok(study_year)
    }

    async fn insert_group(&self, dto: &CreateGroupDto) -> Result<Group, AppError> {
        sqlx::query_as::<_, Group>(
            r#"INSERT INTO groups (name, group_number, semester, study_year_id, learning_type_id)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, name, group_number, semester, study_year_id, learning_type_id, created_at, updated_at"#,
        )
        .bind(dto.name.trim())
        .bind(dto.group_number)
        .bind(dto.semester)
        .bind(dto.study_year_id)
        .bind(dto.learning_type_id)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_error)
    }

    async fn find_group(&self, id: GroupId) -> Result<Option<Group>, AppError> {
        let group = sqlx::query_as::<_, Group>(
            r#"SELECT id, name, group_number, semester, study_year_id, learning_type_id, created_at, updated_at
               FROM groups WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(group)
    }

    async fn find_groups(&self, ids: &[GroupId]) -> Result<Vec<Group>, AppError> {
        let groups = sqlx::query_as::<_, Group>(
            r#"SELECT id, name, group_number, semester, study_year_id, learning_type_id, created_at, updated_at
               FROM groups WHERE id = ANY($1)"#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn insert_discipline(&self, dto: &CreateDisciplineDto) -> Result<Discipline, AppError> {
        sqlx::query_as::<_, Discipline>(
            r#"INSERT INTO disciplines (name, semester, teacher_id, study_year_id, learning_type_id)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, name, semester, teacher_id, study_year_id, learning_type_id, created_at, updated_at"#,
        )
        .bind(dto.name.trim())
        .bind(dto.semester)
        .bind(dto.teacher_id)
        .bind(dto.study_year_id)
        .bind(dto.learning_type_id)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_error)
    }

    async fn find_discipline(&self, id: DisciplineId) -> Result<Option<Discipline>, AppError> {
        let discipline = sqlx::query_as::<_, Discipline>(
            r#"SELECT id, name, semester, teacher_id, study_year_id, learning_type_id, created_at, updated_at
               FROM disciplines WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(discipline)
    }

    async fn insert_teacher(
        &self,
        dto: &CreateTeacherDto,
        actor: UserId,
    ) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(&format!(
            r#"INSERT INTO teachers (name, email, user_id, created_by_id, updated_by_id)
               VALUES ($1, $2, $3, $4, $4)
               RETURNING {TEACHER_COLUMNS}"#
        ))
        .bind(dto.name.trim())
        .bind(dto.email.as_deref())
        .bind(dto.user_id)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_error)
    }

    async fn find_teacher(&self, id: TeacherId) -> Result<Option<Teacher>, AppError> {
        let teacher = sqlx::query_as::<_, Teacher>(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(teacher)
    }

    async fn insert_classroom(
        &self,
        dto: &CreateClassroomDto,
        actor: UserId,
    ) -> Result<Classroom, AppError> {
        sqlx::query_as::<_, Classroom>(
            r#"INSERT INTO classrooms (name, capacity, created_by_id, updated_by_id)
               VALUES ($1, $2, $3, $3)
               RETURNING id, name, capacity, created_by_id, updated_by_id, created_at, updated_at"#,
        )
        .bind(dto.name.trim())
        .bind(dto.capacity)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_error)
    }

    async fn find_classroom(&self, id: ClassroomId) -> Result<Option<Classroom>, AppError> {
        let classroom = sqlx::query_as::<_, Classroom>(
            r#"SELECT id, name, capacity, created_by_id, updated_by_id, created_at, updated_at
               FROM classrooms WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(classroom)
    }

    #[instrument(skip(self))]
    async fn count_dependent_events(&self, node: CalendarNode) -> Result<u64, AppError> {
        let sql = match node {
            CalendarNode::AcademicYear(_) => {
                "SELECT COUNT(*) FROM events WHERE academic_year_id = $1"
            }
            CalendarNode::LearningType(_) => {
                r#"SELECT COUNT(DISTINCT e.id) FROM events e
                   LEFT JOIN event_groups eg ON eg.event_id = e.id
                   LEFT JOIN groups g ON g.id = eg.group_id
                   LEFT JOIN disciplines d ON d.id = e.discipline_id
                   WHERE e.learning_type_id = $1 OR g.learning_type_id = $1 OR d.learning_type_id = $1"#
            }
            CalendarNode::StudyYear(_) => {
                r#"SELECT COUNT(DISTINCT e.id) FROM events e
                   LEFT JOIN event_groups eg ON eg.event_id = e.id
                   LEFT JOIN groups g ON g.id = eg.group_id
                   LEFT JOIN disciplines d ON d.id = e.discipline_id
                   WHERE g.study_year_id = $1 OR d.study_year_id = $1"#
            }
            CalendarNode::Group(_) => "SELECT COUNT(*) FROM event_groups WHERE group_id = $1",
            CalendarNode::Discipline(_) => "SELECT COUNT(*) FROM events WHERE discipline_id = $1",
            CalendarNode::Teacher(_) => {
                r#"SELECT COUNT(*) FROM events e
                   LEFT JOIN disciplines d ON d.id = e.discipline_id
                   WHERE e.teacher_id = $1 OR d.teacher_id = $1"#
            }
            CalendarNode::Classroom(_) => "SELECT COUNT(*) FROM events WHERE classroom_id = $1",
        };

        let count = sqlx::query_scalar::<_, i64>(sql)
            .bind(node.uuid())
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn delete_node(&self, node: CalendarNode) -> Result<bool, AppError> {
        let table = match node {
            CalendarNode::AcademicYear(_) => "academic_years",
            CalendarNode::LearningType(_) => "learning_types",
            CalendarNode::StudyYear(_) => "study_years",
            CalendarNode::Group(_) => "groups",
            CalendarNode::Discipline(_) => "disciplines",
            CalendarNode::Teacher(_) => "teachers",
            CalendarNode::Classroom(_) => "classrooms",
        };

        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(node.uuid())
            .execute(&self.pool)
            .await
            .map_err(|err| match constraint_error(err) {
                e if e.kind == orar_core::ErrorKind::Conflict => AppError::conflict(
                    anyhow::anyhow!("{} is still referenced by other records", node.label()),
                ),
                e => e,
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl NotificationRepository for PgStore {
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, AppError> {
        let row = sqlx::query_as::<_, Notification>(
            r#"INSERT INTO notifications (user_id, title, message)
               VALUES ($1, $2, $3)
               RETURNING id, user_id, title, message, is_read, created_at"#,
        )
        .bind(notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"SELECT id, user_id, title, message, is_read, created_at FROM notifications
               WHERE user_id = $1 AND (NOT $2 OR is_read = FALSE)
               ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn mark_notification_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<Option<Notification>, AppError> {
        let row = sqlx::query_as::<_, Notification>(
            r#"UPDATE notifications SET is_read = TRUE
               WHERE id = $1 AND user_id = $2
               RETURNING id, user_id, title, message, is_read, created_at"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at"
        ))
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn find_teacher_for_user(
        &self,
        user_id: UserId,
        email: &str,
    ) -> Result<Option<Teacher>, AppError> {
        let teacher = sqlx::query_as::<_, Teacher>(&format!(
            r#"SELECT {TEACHER_COLUMNS} FROM teachers
               WHERE user_id = $1 OR LOWER(email) = LOWER($2)
               ORDER BY (user_id = $1) DESC NULLS LAST, created_at
               LIMIT 1"#
        ))
        .bind(user_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(teacher)
    }
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore").finish_non_exhaustive()
    }
}
