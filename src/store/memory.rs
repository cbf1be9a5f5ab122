//! In-process store used by the test suite.
//!
//! All tables sit behind one lock, so every multi-row write is atomic from
//! the point of view of concurrent readers. Uniqueness and restrict rules
//! mirror the constraints in `migrations/`.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

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

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    academic_years: Vec<AcademicYear>,
    learning_types: Vec<LearningType>,
    study_years: Vec<StudyYear>,
    groups: Vec<Group>,
    disciplines: Vec<Discipline>,
    teachers: Vec<Teacher>,
    classrooms: Vec<Classroom>,
    events: Vec<Event>,
    event_groups: BTreeMap<EventId, Vec<GroupId>>,
    notifications: Vec<Notification>,
    failing_recipients: HashSet<UserId>,
}

impl Tables {
    fn with_groups(&self, event: &Event) -> EventWithGroups {
        EventWithGroups {
            event: event.clone(),
            group_ids: self.event_groups.get(&event.id).cloned().unwrap_or_default(),
        }
    }

    fn event_mut(&mut self, id: EventId) -> Option<&mut Event> {
        self.events.iter_mut().find(|e| e.id == id)
    }

    fn groups_of(&self, event_id: EventId) -> impl Iterator<Item = &Group> {
        let ids = self.event_groups.get(&event_id);
        self.groups
            .iter()
            .filter(move |g| ids.is_some_and(|ids| ids.contains(&g.id)))
    }

    fn discipline_of(&self, event: &Event) -> Option<&Discipline> {
        self.disciplines.iter().find(|d| d.id == event.discipline_id)
    }

    fn depends_on(&self, event: &Event, node: CalendarNode) -> bool {
        match node {
            CalendarNode::AcademicYear(id) => event.academic_year_id == id,
            CalendarNode::LearningType(id) => {
                event.learning_type_id == id
                    || self.groups_of(event.id).any(|g| g.learning_type_id == id)
                    || self
                        .discipline_of(event)
                        .is_some_and(|d| d.learning_type_id == id)
            }
            CalendarNode::StudyYear(id) => {
                self.groups_of(event.id).any(|g| g.study_year_id == id)
                    || self
                        .discipline_of(event)
                        .is_some_and(|d| d.study_year_id == id)
            }
            CalendarNode::Group(id) => self
                .event_groups
                .get(&event.id)
                .is_some_and(|ids| ids.contains(&id)),
            CalendarNode::Discipline(id) => event.discipline_id == id,
            CalendarNode::Teacher(id) => {
                event.teacher_id == id || self.discipline_of(event).is_some_and(|d| d.teacher_id == id)
            }
            CalendarNode::Classroom(id) => event.classroom_id == id,
        }
    }

    /// Whether any row holds a restricting foreign key to the node.
    fn is_referenced(&self, node: CalendarNode) -> bool {
        match node {
            CalendarNode::AcademicYear(id) => self.events.iter().any(|e| e.academic_year_id == id),
            CalendarNode::LearningType(id) => {
                self.study_years.iter().any(|s| s.learning_type_id == id)
                    || self.groups.iter().any(|g| g.learning_type_id == id)
                    || self.disciplines.iter().any(|d| d.learning_type_id == id)
                    || self.events.iter().any(|e| e.learning_type_id == id)
            }
            CalendarNode::StudyYear(id) => {
                self.groups.iter().any(|g| g.study_year_id == id)
                    || self.disciplines.iter().any(|d| d.study_year_id == id)
            }
            CalendarNode::Group(id) => self.event_groups.values().any(|ids| ids.contains(&id)),
            CalendarNode::Discipline(id) => self.events.iter().any(|e| e.discipline_id == id),
            CalendarNode::Teacher(id) => {
                self.disciplines.iter().any(|d| d.teacher_id == id)
                    || self.events.iter().any(|e| e.teacher_id == id)
            }
            CalendarNode::Classroom(id) => self.events.iter().any(|e| e.classroom_id == id),
        }
    }
}

fn write_fields(event: &mut Event, fields: &EventFields) {
    event.day = fields.day;
    event.start_hour = fields.start_hour;
    event.end_hour = fields.end_hour;
    event.event_type = fields.event_type;
    event.event_recurrence = fields.event_recurrence;
    event.semester = fields.semester;
    event.academic_year_id = fields.academic_year_id;
    event.learning_type_id = fields.learning_type_id;
    event.teacher_id = fields.teacher_id;
    event.discipline_id = fields.discipline_id;
    event.classroom_id = fields.classroom_id;
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a directory user.
    pub fn add_user(&self, first_name: &str, last_name: &str, email: &str, role: UserRole) -> User {
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            role,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().users.push(user.clone());
        user
    }

    /// Makes every later notification insert for `user_id` fail.
    pub fn fail_notifications_for(&self, user_id: UserId) {
        self.tables.write().failing_recipients.insert(user_id);
    }

    pub fn event_count(&self) -> usize {
        self.tables.read().events.len()
    }

    pub fn notifications_for(&self, user_id: UserId) -> Vec<Notification> {
        self.tables
            .read()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn insert_event(
        &self,
        fields: &EventFields,
        status: EventStatus,
        group_ids: &[GroupId],
        actor: UserId,
    ) -> Result<EventWithGroups, AppError> {
        let now = Utc::now();
        let event = Event {
            id: EventId::new(),
            day: fields.day,
            start_hour: fields.start_hour,
            end_hour: fields.end_hour,
            event_type: fields.event_type,
            event_recurrence: fields.event_recurrence,
            semester: fields.semester,
            status,
            rejection_reason: None,
            approved_by_id: None,
            approved_at: None,
            published_by_id: None,
            published_at: None,
            academic_year_id: fields.academic_year_id,
            learning_type_id: fields.learning_type_id,
            teacher_id: fields.teacher_id,
            discipline_id: fields.discipline_id,
            classroom_id: fields.classroom_id,
            created_by_id: Some(actor),
            updated_by_id: Some(actor),
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.tables.write();
        tables.event_groups.insert(event.id, group_ids.to_vec());
        tables.events.push(event.clone());

        Ok(EventWithGroups {
            event,
            group_ids: group_ids.to_vec(),
        })
    }

    async fn replace_event(
        &self,
        id: EventId,
        fields: &EventFields,
        group_ids: &[GroupId],
        actor: UserId,
    ) -> Result<Option<EventWithGroups>, AppError> {
        let mut tables = self.tables.write();
        let Some(event) = tables.event_mut(id) else {
            return Ok(None);
        };
        write_fields(event, fields);
        event.updated_by_id = Some(actor);
        event.updated_at = Utc::now();
        let event = event.clone();

        tables.event_groups.insert(id, group_ids.to_vec());
        Ok(Some(tables.with_groups(&event)))
    }

    async fn delete_event(&self, id: EventId) -> Result<bool, AppError> {
        let mut tables = self.tables.write();
        let before = tables.events.len();
        tables.events.retain(|e| e.id != id);
        tables.event_groups.remove(&id);
        Ok(tables.events.len() < before)
    }

    async fn find_event(&self, id: EventId) -> Result<Option<EventWithGroups>, AppError> {
        let tables = self.tables.read();
        Ok(tables
            .events
            .iter()
            .find(|e| e.id == id)
            .map(|e| tables.with_groups(e)))
    }

    async fn list_events(
        &self,
        filter: &EventFilterParams,
    ) -> Result<Vec<EventWithGroups>, AppError> {
        let tables = self.tables.read();
        let mut events: Vec<EventWithGroups> = tables
            .events
            .iter()
            .map(|e| tables.with_groups(e))
            .filter(|e| filter.matches(e))
            .collect();
        events.sort_by_key(|e| (e.event.day, e.event.start_hour, e.event.created_at));
        Ok(events)
    }

    async fn move_event(
        &self,
        id: EventId,
        day: Day,
        start_hour: HourOfDay,
        end_hour: HourOfDay,
        actor: UserId,
    ) -> Result<Option<Event>, AppError> {
        let mut tables = self.tables.write();
        Ok(tables.event_mut(id).map(|event| {
            event.day = day;
            event.start_hour = start_hour;
            event.end_hour = end_hour;
            event.updated_by_id = Some(actor);
            event.updated_at = Utc::now();
            event.clone()
        }))
    }

    async fn apply_status_change(
        &self,
        id: EventId,
        change: &StatusChange,
    ) -> Result<Option<Event>, AppError> {
        let mut tables = self.tables.write();
        let Some(event) = tables.event_mut(id) else {
            return Ok(None);
        };
        if event.status != change.from {
            return Ok(None);
        }

        event.status = change.to;
        event.rejection_reason = change.rejection_reason.clone();
        match change.approval {
            ApprovalStamp::Keep => {}
            ApprovalStamp::Backfill => {
                if event.approved_at.is_none() {
                    event.approved_by_id = Some(change.actor);
                    event.approved_at = Some(change.at);
                }
            }
        }
        if change.stamp_publication {
            event.published_by_id = Some(change.actor);
            event.published_at = Some(change.at);
        }
        event.updated_by_id = Some(change.actor);
        event.updated_at = change.at;

        Ok(Some(event.clone()))
    }

    async fn find_open_events_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Vec<Event>, AppError> {
        let tables = self.tables.read();
        Ok(tables
            .events
            .iter()
            .filter(|e| {
                e.teacher_id == teacher_id
                    && matches!(e.status, EventStatus::Draft | EventStatus::PendingApproval)
            })
            .cloned()
            .collect())
    }

    async fn submit_drafts(&self, ids: &[EventId], actor: UserId) -> Result<u64, AppError> {
        let mut tables = self.tables.write();
        let now = Utc::now();
        let mut affected = 0;
        for event in tables
            .events
            .iter_mut()
            .filter(|e| ids.contains(&e.id) && e.status == EventStatus::Draft)
        {
            event.status = EventStatus::PendingApproval;
            event.updated_by_id = Some(actor);
            event.updated_at = now;
            affected += 1;
        }
        Ok(affected)
    }
}

#[async_trait]
impl CalendarRepository for InMemoryStore {
    async fn insert_academic_year(
        &self,
        dto: &CreateAcademicYearDto,
        actor: UserId,
    ) -> Result<AcademicYear, AppError> {
        let mut tables = self.tables.write();
        if tables
            .academic_years
            .iter()
            .any(|y| y.start_year == dto.start_year && y.end_year == dto.end_year)
        {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Academic year {}-{} already exists",
                dto.start_year,
                dto.end_year
            )));
        }
        let now = Utc::now();
        let year = AcademicYear {
            id: AcademicYearId::new(),
            start_year: dto.start_year,
            end_year: dto.end_year,
            published: dto.published,
            created_by_id: Some(actor),
            updated_by_id: Some(actor),
            created_at: now,
            updated_at: now,
        };
        tables.academic_years.push(year.clone());
        Ok(year)
    }

    async fn find_academic_year(
        &self,
        id: AcademicYearId,
    ) -> Result<Option<AcademicYear>, AppError> {
        Ok(self
            .tables
            .read()
            .academic_years
            .iter()
            .find(|y| y.id == id)
            .cloned())
    }

    async fn find_academic_year_by_span(
        &self,
        start_year: i32,
        end_year: i32,
    ) -> Result<Option<AcademicYear>, AppError> {
        Ok(self
            .tables
            .read()
            .academic_years
            .iter()
            .find(|y| y.start_year == start_year && y.end_year == end_year)
            .cloned())
    }

    async fn insert_learning_type(
        &self,
        dto: &CreateLearningTypeDto,
    ) -> Result<LearningType, AppError> {
        let mut tables = self.tables.write();
        let cycle = dto.learning_cycle.trim();
        if tables
            .learning_types
            .iter()
            .any(|t| t.learning_cycle.to_lowercase() == cycle.to_lowercase())
        {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Learning type '{}' already exists",
                cycle
            )));
        }
        let now = Utc::now();
        let learning_type = LearningType {
            id: LearningTypeId::new(),
            learning_cycle: cycle.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.learning_types.push(learning_type.clone());
        Ok(learning_type)
    }

    async fn find_learning_type(
        &self,
        id: LearningTypeId,
    ) -> Result<Option<LearningType>, AppError> {
        Ok(self
            .tables
            .read()
            .learning_types
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn find_learning_type_by_cycle(
        &self,
        learning_cycle: &str,
    ) -> Result<Option<LearningType>, AppError> {
        let wanted = learning_cycle.trim().to_lowercase();
        Ok(self
            .tables
            .read()
            .learning_types
            .iter()
            .find(|t| t.learning_cycle.to_lowercase() == wanted)
            .cloned())
    }

    async fn learning_type_stats(
        &self,
        id: LearningTypeId,
    ) -> Result<Option<LearningTypeWithStats>, AppError> {
        let tables = self.tables.read();
        let Some(learning_type) = tables.learning_types.iter().find(|t| t.id == id).cloned() else {
            return Ok(None);
        };
        Ok(Some(LearningTypeWithStats {
            learning_type,
            study_year_count: tables
                .study_years
                .iter()
                .filter(|s| s.learning_type_id == id)
                .count() as i64,
            group_count: tables
                .groups
                .iter()
                .filter(|g| g.learning_type_id == id)
                .count() as i64,
            discipline_count: tables
                .disciplines
                .iter()
                .filter(|d| d.learning_type_id == id)
                .count() as i64,
        }))
    }

    async fn insert_study_year(&self, dto: &CreateStudyYearDto) -> Result<StudyYear, AppError> {
        let mut tables = self.tables.write();
        if tables
            .study_years
            .iter()
            .any(|s| s.learning_type_id == dto.learning_type_id && s.year == dto.year)
        {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Study year {} already exists for this learning type",
                dto.year
            )));
        }
        let now = Utc::now();
        let study_year = StudyYear {
            id: StudyYearId::new(),
            year: dto.year,
            learning_type_id: dto.learning_type_id,
            created_at: now,
            updated_at: now,
        };
        tables.study_years.push(study_year.clone());
        Ok(study_year)
    }

    async fn find_study_year(&self, id: StudyYearId) -> Result<Option<StudyYear>, AppError> {
        Ok(self
            .tables
            .read()
            .study_years
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn find_study_year_by_number(
        &self,
        learning_type_id: LearningTypeId,
        year: i16,
    ) -> Result<Option<StudyYear>, AppError> {
        Ok(self
            .tables
            .read()
            .study_years
            .iter()
            .find(|s| s.learning_type_id == learning_type_id && s.year == year)
            .cloned())
    }

    async fn insert_group(&self, dto: &CreateGroupDto) -> Result<Group, AppError> {
        let mut tables = self.tables.write();
        let name = dto.name.trim();
        if tables
            .groups
            .iter()
            .any(|g| g.study_year_id == dto.study_year_id && g.name == name)
        {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Group '{}' already exists in this study year",
                name
            )));
        }
        let now = Utc::now();
        let group = Group {
            id: GroupId::new(),
            name: name.to_string(),
            group_number: dto.group_number,
            semester: dto.semester,
            study_year_id: dto.study_year_id,
            learning_type_id: dto.learning_type_id,
            created_at: now,
            updated_at: now,
        };
        tables.groups.push(group.clone());
        Ok(group)
    }

    async fn find_group(&self, id: GroupId) -> Result<Option<Group>, AppError> {
        Ok(self
            .tables
            .read()
            .groups
            .iter()
            .find(|g| g.id == id)
            .cloned())
    }

    async fn find_groups(&self, ids: &[GroupId]) -> Result<Vec<Group>, AppError> {
        Ok(self
            .tables
            .read()
            .groups
            .iter()
            .filter(|g| ids.contains(&g.id))
            .cloned()
            .collect())
    }

    async fn insert_discipline(&self, dto: &CreateDisciplineDto) -> Result<Discipline, AppError> {
        let now = Utc::now();
        let discipline = Discipline {
            id: DisciplineId::new(),
            name: dto.name.trim().to_string(),
            semester: dto.semester,
            teacher_id: dto.teacher_id,
            study_year_id: dto.study_year_id,
            learning_type_id: dto.learning_type_id,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().disciplines.push(discipline.clone());
        Ok(discipline)
    }

    async fn find_discipline(&self, id: DisciplineId) -> Result<Option<Discipline>, AppError> {
        Ok(self
            .tables
            .read()
            .disciplines
            .iter()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn insert_teacher(
        &self,
        dto: &CreateTeacherDto,
        actor: UserId,
    ) -> Result<Teacher, AppError> {
        let now = Utc::now();
        let teacher = Teacher {
            id: TeacherId::new(),
            name: dto.name.trim().to_string(),
            email: dto.email.clone(),
            user_id: dto.user_id,
            created_by_id: Some(actor),
            updated_by_id: Some(actor),
            created_at: now,
            updated_at: now,
        };
        self.tables.write().teachers.push(teacher.clone());
        Ok(teacher)
    }

    async fn find_teacher(&self, id: TeacherId) -> Result<Option<Teacher>, AppError> {
        Ok(self
            .tables
            .read()
            .teachers
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn insert_classroom(
        &self,
        dto: &CreateClassroomDto,
        actor: UserId,
    ) -> Result<Classroom, AppError> {
        let mut tables = self.tables.write();
        let name = dto.name.trim();
        if tables.classrooms.iter().any(|c| c.name == name) {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Classroom '{}' already exists",
                name
            )));
        }
        let now = Utc::now();
        let classroom = Classroom {
            id: ClassroomId::new(),
            name: name.to_string(),
            capacity: dto.capacity,
            created_by_id: Some(actor),
            updated_by_id: Some(actor),
            created_at: now,
            updated_at: now,
        };
        tables.classrooms.push(classroom.clone());
        Ok(classroom)
    }

    async fn find_classroom(&self, id: ClassroomId) -> Result<Option<Classroom>, AppError> {
        Ok(self
            .tables
            .read()
            .classrooms
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn count_dependent_events(&self, node: CalendarNode) -> Result<u64, AppError> {
        let tables = self.tables.read();
        Ok(tables
            .events
            .iter()
            .filter(|e| tables.depends_on(e, node))
            .count() as u64)
    }

    async fn delete_node(&self, node: CalendarNode) -> Result<bool, AppError> {
        let mut tables = self.tables.write();
        if tables.is_referenced(node) {
            return Err(AppError::conflict(anyhow::anyhow!(
                "{} is still referenced by other records",
                node.label()
            )));
        }

        macro_rules! remove {
            ($table:ident, $id:expr) => {{
                let before = tables.$table.len();
                tables.$table.retain(|row| row.id != $id);
                tables.$table.len() < before
            }};
        }

        let removed = match node {
            CalendarNode::AcademicYear(id) => remove!(academic_years, id),
            CalendarNode::LearningType(id) => remove!(learning_types, id),
            CalendarNode::StudyYear(id) => remove!(study_years, id),
            CalendarNode::Group(id) => remove!(groups, id),
            CalendarNode::Discipline(id) => remove!(disciplines, id),
            CalendarNode::Teacher(id) => remove!(teachers, id),
            CalendarNode::Classroom(id) => remove!(classrooms, id),
        };
        Ok(removed)
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, AppError> {
        let mut tables = self.tables.write();
        if tables.failing_recipients.contains(&notification.user_id) {
            return Err(AppError::persistence(anyhow::anyhow!(
                "notification insert failed for {}",
                notification.user_id
            )));
        }
        let row = Notification {
            id: NotificationId::new(),
            user_id: notification.user_id,
            title: notification.title.clone(),
            message: notification.message.clone(),
            is_read: false,
            created_at: Utc::now(),
        };
        tables.notifications.push(row.clone());
        Ok(row)
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError> {
        let tables = self.tables.read();
        let mut rows: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
            .cloned()
            .collect();
        rows.reverse();
        Ok(rows)
    }

    async fn mark_notification_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<Option<Notification>, AppError> {
        let mut tables = self.tables.write();
        Ok(tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|n| {
                n.is_read = true;
                n.clone()
            }))
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, AppError> {
        Ok(self
            .tables
            .read()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>, AppError> {
        Ok(self
            .tables
            .read()
            .users
            .iter()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }

    async fn find_teacher_for_user(
        &self,
        user_id: UserId,
        email: &str,
    ) -> Result<Option<Teacher>, AppError> {
        let tables = self.tables.read();
        let by_user = tables.teachers.iter().find(|t| t.user_id == Some(user_id));
        let by_email = || {
            tables.teachers.iter().find(|t| {
                t.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
        };
        Ok(by_user.or_else(by_email).cloned())
    }
}
