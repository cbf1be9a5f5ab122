use anyhow::anyhow;
use tracing::{info, instrument};
use validator::Validate;

use orar_core::AppError;
use orar_models::calendar::{
    AcademicYear, CalendarNode, Classroom, CreateAcademicYearDto, CreateClassroomDto,
    CreateDisciplineDto, CreateGroupDto, CreateLearningTypeDto, CreateStudyYearDto,
    CreateTeacherDto, Discipline, Group, LearningType, LearningTypeWithStats, StudyYear, Teacher,
};
use orar_models::ids::{
    AcademicYearId, ClassroomId, DisciplineId, GroupId, LearningTypeId, StudyYearId, TeacherId,
};
use orar_models::users::Principal;

use crate::store::ScheduleStore;

pub struct CalendarService;

fn validate<T: Validate>(dto: &T) -> Result<(), AppError> {
    dto.validate().map_err(|e| AppError::from_validation(&e))
}

fn not_found(what: &str) -> AppError {
    AppError::not_found(anyhow!("{} not found", what))
}

impl CalendarService {
    #[instrument(skip(store, dto))]
    pub async fn create_academic_year(
        store: &dyn ScheduleStore,
        actor: &Principal,
        dto: CreateAcademicYearDto,
    ) -> Result<AcademicYear, AppError> {
        validate(&dto)?;
        let year = store.insert_academic_year(&dto, actor.id).await?;
        info!(academic_year_id = %year.id, label = %year.label(), "Academic year created");
        Ok(year)
    }

    pub async fn get_academic_year(
        store: &dyn ScheduleStore,
        id: AcademicYearId,
    ) -> Result<AcademicYear, AppError> {
        store
            .find_academic_year(id)
            .await?
            .ok_or_else(|| not_found("Academic year"))
    }

    pub async fn find_academic_year_by_span(
        store: &dyn ScheduleStore,
        start_year: i32,
        end_year: i32,
    ) -> Result<Option<AcademicYear>, AppError> {
        store.find_academic_year_by_span(start_year, end_year).await
    }

    #[instrument(skip(store, dto))]
    pub async fn create_learning_type(
        store: &dyn ScheduleStore,
        dto: CreateLearningTypeDto,
    ) -> Result<LearningType, AppError> {
        validate(&dto)?;
        let dto = CreateLearningTypeDto {
            learning_cycle: dto.learning_cycle.trim().to_string(),
        };
        let learning_type = store.insert_learning_type(&dto).await?;
        info!(learning_type_id = %learning_type.id, "Learning type created");
        Ok(learning_type)
    }

    pub async fn get_learning_type(
        store: &dyn ScheduleStore,
        id: LearningTypeId,
    ) -> Result<LearningType, AppError> {
        store
            .find_learning_type(id)
            .await?
            .ok_or_else(|| not_found("Learning type"))
    }

    pub async fn find_learning_type_by_cycle(
        store: &dyn ScheduleStore,
        learning_cycle: &str,
    ) -> Result<Option<LearningType>, AppError> {
        store.find_learning_type_by_cycle(learning_cycle.trim()).await
    }

    pub async fn learning_type_stats(
        store: &dyn ScheduleStore,
        id: LearningTypeId,
    ) -> Result<LearningTypeWithStats, AppError> {
        store
            .learning_type_stats(id)
            .await?
            .ok_or_else(|| not_found("Learning type"))
    }

    #[instrument(skip(store, dto))]
    pub async fn create_study_year(
        store: &dyn ScheduleStore,
        dto: CreateStudyYearDto,
    ) -> Result<StudyYear, AppError> {
        validate(&dto)?;
        if store.find_learning_type(dto.learning_type_id).await?.is_none() {
            return Err(AppError::field("learning_type_id", "Learning type not found"));
        }

        let study_year = store.insert_study_year(&dto).await?;
        info!(study_year_id = %study_year.id, year = study_year.year, "Study year created");
        Ok(study_year)
    }

    pub async fn get_study_year(
        store: &dyn ScheduleStore,
        id: StudyYearId,
    ) -> Result<StudyYear, AppError> {
        store
            .find_study_year(id)
            .await?
            .ok_or_else(|| not_found("Study year"))
    }

    /// Checks that the study year exists and belongs to the learning type.
    async fn check_study_year(
        store: &dyn ScheduleStore,
        study_year_id: StudyYearId,
        learning_type_id: LearningTypeId,
    ) -> Result<(), AppError> {
        let study_year = store
            .find_study_year(study_year_id)
            .await?
            .ok_or_else(|| AppError::field("study_year_id", "Study year not found"))?;
        if study_year.learning_type_id != learning_type_id {
            return Err(AppError::field(
                "learning_type_id",
                "Study year belongs to a different learning type",
            ));
        }
        Ok(())
    }

    #[instrument(skip(store, dto))]
    pub async fn create_group(
        store: &dyn ScheduleStore,
        dto: CreateGroupDto,
    ) -> Result<Group, AppError> {
        validate(&dto)?;
        Self::check_study_year(store, dto.study_year_id, dto.learning_type_id).await?;

        let group = store.insert_group(&dto).await?;
        info!(group_id = %group.id, name = %group.name, "Group created");
        Ok(group)
    }

    pub async fn get_group(store: &dyn ScheduleStore, id: GroupId) -> Result<Group, AppError> {
        store.find_group(id).await?.ok_or_else(|| not_found("Group"))
    }

    #[instrument(skip(store, dto))]
    pub async fn create_discipline(
        store: &dyn ScheduleStore,
        dto: CreateDisciplineDto,
    ) -> Result<Discipline, AppError> {
        validate(&dto)?;
        if store.find_teacher(dto.teacher_id).await?.is_none() {
            return Err(AppError::field("teacher_id", "Teacher not found"));
        }
        Self::check_study_year(store, dto.study_year_id, dto.learning_type_id).await?;

        let discipline = store.insert_discipline(&dto).await?;
        info!(discipline_id = %discipline.id, name = %discipline.name, "Discipline created");
        Ok(discipline)
    }

    pub async fn get_discipline(
        store: &dyn ScheduleStore,
        id: DisciplineId,
    ) -> Result<Discipline, AppError> {
        store
            .find_discipline(id)
            .await?
            .ok_or_else(|| not_found("Discipline"))
    }

    #[instrument(skip(store, dto))]
    pub async fn create_teacher(
        store: &dyn ScheduleStore,
        actor: &Principal,
        dto: CreateTeacherDto,
    ) -> Result<Teacher, AppError> {
        validate(&dto)?;
        if let Some(user_id) = dto.user_id
            && store.find_user(user_id).await?.is_none()
        {
            return Err(AppError::field("user_id", "User not found"));
        }

        let teacher = store.insert_teacher(&dto, actor.id).await?;
        info!(teacher_id = %teacher.id, "Teacher created");
        Ok(teacher)
    }

    pub async fn get_teacher(store: &dyn ScheduleStore, id: TeacherId) -> Result<Teacher, AppError> {
        store
            .find_teacher(id)
            .await?
            .ok_or_else(|| not_found("Teacher"))
    }

    #[instrument(skip(store, dto))]
    pub async fn create_classroom(
        store: &dyn ScheduleStore,
        actor: &Principal,
        dto: CreateClassroomDto,
    ) -> Result<Classroom, AppError> {
        validate(&dto)?;
        let classroom = store.insert_classroom(&dto, actor.id).await?;
        info!(classroom_id = %classroom.id, name = %classroom.name, "Classroom created");
        Ok(classroom)
    }

    pub async fn get_classroom(
        store: &dyn ScheduleStore,
        id: ClassroomId,
    ) -> Result<Classroom, AppError> {
        store
            .find_classroom(id)
            .await?
            .ok_or_else(|| not_found("Classroom"))
    }

    /// Deletes any hierarchy node, refusing while events still depend on it.
    #[instrument(skip(store))]
    pub async fn delete_node(store: &dyn ScheduleStore, node: CalendarNode) -> Result<(), AppError> {
        let dependents = store.count_dependent_events(node).await?;
        if dependents > 0 {
            return Err(AppError::conflict(anyhow!(
                "{} is used by {} event(s)",
                node.label(),
                dependents
            )));
        }

        if !store.delete_node(node).await? {
            return Err(not_found(node.label()));
        }

        info!(node = %node, "Calendar node deleted");
        Ok(())
    }
}
