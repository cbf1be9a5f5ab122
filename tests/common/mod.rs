#![allow(dead_code)]

use std::ops::Deref;
use std::sync::Arc;

use axum::Router;
use orar::modules::calendar::service::CalendarService;
use orar::modules::events::service::EventService;
use orar::store::ScheduleStore;
use orar::store::memory::InMemoryStore;
use orar::{AppState, init_router};
use orar_auth::create_access_token;
use orar_config::{CorsConfig, JwtConfig};
use orar_models::calendar::{
    AcademicYear, Classroom, CreateAcademicYearDto, CreateClassroomDto, CreateDisciplineDto,
    CreateGroupDto, CreateLearningTypeDto, CreateStudyYearDto, CreateTeacherDto, Discipline,
    Group, LearningType, StudyYear, Teacher,
};
use orar_models::events::{CreateEventDto, EventWithGroups, UpdateEventDto};
use orar_models::schedule::{Day, EventType, Recurrence};
use orar_models::users::{Principal, User, UserRole};

pub const JWT_SECRET: &str = "orar-test-secret";

/// One learning type, one study year, three groups, a teacher linked to
/// the professor account and a second teacher matched only by email.
pub struct Calendar {
    pub academic_year: AcademicYear,
    pub learning_type: LearningType,
    pub study_year: StudyYear,
    pub groups: Vec<Group>,
    pub teacher: Teacher,
    pub colleague_teacher: Teacher,
    pub discipline: Discipline,
    pub classroom: Classroom,
}

/// Seeds [`Calendar`] through the calendar service, so it works against
/// any store.
pub async fn seed_calendar(s: &dyn ScheduleStore, admin: &User, professor: &User) -> Calendar {
    let actor = Principal::from(admin);

    let academic_year = CalendarService::create_academic_year(
        s,
        &actor,
        CreateAcademicYearDto {
            start_year: 2025,
            end_year: 2026,
            published: true,
        },
    )
    .await
    .unwrap();

    let learning_type = CalendarService::create_learning_type(
        s,
        CreateLearningTypeDto {
            learning_cycle: "Licență".to_string(),
        },
    )
    .await
    .unwrap();

    let study_year = CalendarService::create_study_year(
        s,
        CreateStudyYearDto {
            year: 1,
            learning_type_id: learning_type.id,
        },
    )
    .await
    .unwrap();

    let mut groups = Vec::new();
    for number in 1..=3 {
        let group = CalendarService::create_group(
            s,
            CreateGroupDto {
                name: format!("10{number}"),
                group_number: number,
                semester: 1,
                study_year_id: study_year.id,
                learning_type_id: learning_type.id,
            },
        )
        .await
        .unwrap();
        groups.push(group);
    }

    let teacher = CalendarService::create_teacher(
        s,
        &actor,
        CreateTeacherDto {
            name: "Petru Popescu".to_string(),
            email: None,
            user_id: Some(professor.id),
        },
    )
    .await
    .unwrap();

    let colleague_teacher = CalendarService::create_teacher(
        s,
        &actor,
        CreateTeacherDto {
            name: "Ioana Ionescu".to_string(),
            email: Some("IONESCU@uni.ro".to_string()),
            user_id: None,
        },
    )
    .await
    .unwrap();

    let discipline = CalendarService::create_discipline(
        s,
        CreateDisciplineDto {
            name: "Algoritmi".to_string(),
            semester: 1,
            teacher_id: teacher.id,
            study_year_id: study_year.id,
            learning_type_id: learning_type.id,
        },
    )
    .await
    .unwrap();

    let classroom = CalendarService::create_classroom(
        s,
        &actor,
        CreateClassroomDto {
            name: "C112".to_string(),
            capacity: Some(40),
        },
    )
    .await
    .unwrap();

    Calendar {
        academic_year,
        learning_type,
        study_year,
        groups,
        teacher,
        colleague_teacher,
        discipline,
        classroom,
    }
}

impl Calendar {
    pub fn group_ids(&self, indexes: &[usize]) -> Vec<String> {
        indexes
            .iter()
            .map(|&i| self.groups[i].id.to_string())
            .collect()
    }

    /// Monday 10:00-12:00 course for the linked teacher.
    pub fn event_dto(&self, groups: &[usize]) -> CreateEventDto {
        CreateEventDto {
            day: Day::Luni,
            start_hour: "10:00".to_string(),
            end_hour: "12:00".to_string(),
            event_type: EventType::Course,
            event_recurrence: Recurrence::Toate,
            semester: 1,
            academic_year_id: self.academic_year.id,
            learning_type_id: self.learning_type.id,
            teacher_id: self.teacher.id,
            discipline_id: self.discipline.id,
            classroom_id: self.classroom.id,
            group_ids: self.group_ids(groups),
            status: None,
        }
    }

    pub fn update_dto(&self, groups: &[usize]) -> UpdateEventDto {
        let dto = self.event_dto(groups);
        UpdateEventDto {
            day: dto.day,
            start_hour: dto.start_hour,
            end_hour: dto.end_hour,
            event_type: dto.event_type,
            event_recurrence: dto.event_recurrence,
            semester: dto.semester,
            academic_year_id: dto.academic_year_id,
            learning_type_id: dto.learning_type_id,
            teacher_id: dto.teacher_id,
            discipline_id: dto.discipline_id,
            classroom_id: dto.classroom_id,
            group_ids: dto.group_ids,
        }
    }
}

/// [`Calendar`] on an in-memory store plus one user per role. Calendar
/// fields are reachable directly through `Deref`.
pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub admin: User,
    pub secretary: User,
    pub second_secretary: User,
    pub professor: User,
    /// Professor whose teacher profile is only matched by email
    pub colleague: User,
    pub student: User,
    pub calendar: Calendar,
}

impl Deref for Fixture {
    type Target = Calendar;

    fn deref(&self) -> &Calendar {
        &self.calendar
    }
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let admin = store.add_user("Ana", "Admin", "admin@uni.ro", UserRole::Admin);
        let secretary = store.add_user("Sorina", "Secretar", "secretariat@uni.ro", UserRole::Secretar);
        let second_secretary =
            store.add_user("Simona", "Secretar", "secretariat2@uni.ro", UserRole::Secretar);
        let professor = store.add_user("Petru", "Popescu", "popescu@uni.ro", UserRole::Profesor);
        let colleague = store.add_user("Ioana", "Ionescu", "ionescu@uni.ro", UserRole::Profesor);
        let student = store.add_user("Stefan", "Student", "student@uni.ro", UserRole::Student);

        let calendar = seed_calendar(store.as_ref(), &admin, &professor).await;

        Self {
            store,
            admin,
            secretary,
            second_secretary,
            professor,
            colleague,
            student,
            calendar,
        }
    }

    pub fn principal(user: &User) -> Principal {
        Principal::from(user)
    }

    pub fn as_admin(&self) -> Principal {
        Principal::from(&self.admin)
    }

    pub fn as_secretary(&self) -> Principal {
        Principal::from(&self.secretary)
    }

    pub fn as_professor(&self) -> Principal {
        Principal::from(&self.professor)
    }

    pub fn as_colleague(&self) -> Principal {
        Principal::from(&self.colleague)
    }

    pub fn as_student(&self) -> Principal {
        Principal::from(&self.student)
    }

    /// Creates a draft owned by the fixture teacher, attended by the first group.
    pub async fn create_draft(&self) -> EventWithGroups {
        EventService::create_event(self.store.as_ref(), &self.as_professor(), self.event_dto(&[0]))
            .await
            .unwrap()
    }

    pub fn state(&self) -> AppState {
        AppState::build(
            self.store.clone(),
            JwtConfig::with_secret(JWT_SECRET),
            CorsConfig::default(),
        )
    }

    pub fn app(&self) -> Router {
        init_router(self.state(), None)
    }

    pub fn token(&self, user: &User) -> String {
        create_access_token(
            user.id,
            &user.email,
            user.role,
            &JwtConfig::with_secret(JWT_SECRET),
        )
        .unwrap()
    }
}
