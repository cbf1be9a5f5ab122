use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use orar_core::AppError;
use orar_models::calendar::CalendarNode;
use orar_models::ids::{
    AcademicYearId, ClassroomId, DisciplineId, GroupId, LearningTypeId, StudyYearId, TeacherId,
};

use crate::middleware::auth::AuthUser;
use crate::middleware::role::RequireCalendarEditor;
use crate::modules::calendar::model::{
    AcademicYear, Classroom, CreateAcademicYearDto, CreateClassroomDto, CreateDisciplineDto,
    CreateGroupDto, CreateLearningTypeDto, CreateStudyYearDto, CreateTeacherDto, Discipline,
    Group, LearningType, LearningTypeWithStats, StudyYear, Teacher,
};
use crate::modules::calendar::service::CalendarService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Shared handler body for every `DELETE /api/calendar/<kind>/{id}` route.
async fn delete_node(state: &AppState, node: CalendarNode) -> Result<StatusCode, AppError> {
    CalendarService::delete_node(state.store.as_ref(), node).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Academic years

/// Create an academic year
#[utoipa::path(
    post,
    path = "/api/calendar/academic-years",
    summary = "Create academic year",
    request_body = CreateAcademicYearDto,
    responses(
        (status = 201, description = "Academic year created", body = AcademicYear),
        (status = 403, description = "Forbidden - secretaries and administrators only"),
        (status = 409, description = "Academic year already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_academic_year(
    State(state): State<AppState>,
    RequireCalendarEditor(auth_user): RequireCalendarEditor,
    ValidatedJson(dto): ValidatedJson<CreateAcademicYearDto>,
) -> Result<(StatusCode, Json<AcademicYear>), AppError> {
    let year =
        CalendarService::create_academic_year(state.store.as_ref(), auth_user.principal(), dto)
            .await?;
    Ok((StatusCode::CREATED, Json(year)))
}

#[utoipa::path(
    get,
    path = "/api/calendar/academic-years/{id}",
    summary = "Get academic year",
    params(("id" = Uuid, Path, description = "Academic year ID")),
    responses(
        (status = 200, description = "Academic year", body = AcademicYear),
        (status = 404, description = "Academic year not found")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_academic_year(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AcademicYear>, AppError> {
    let year =
        CalendarService::get_academic_year(state.store.as_ref(), AcademicYearId::from_uuid(id))
            .await?;
    Ok(Json(year))
}

#[utoipa::path(
    delete,
    path = "/api/calendar/academic-years/{id}",
    summary = "Delete academic year",
    params(("id" = Uuid, Path, description = "Academic year ID")),
    responses(
        (status = 204, description = "Academic year deleted"),
        (status = 404, description = "Academic year not found"),
        (status = 409, description = "Academic year still has events")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_academic_year(
    State(state): State<AppState>,
    RequireCalendarEditor(_auth_user): RequireCalendarEditor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_node(&state, CalendarNode::AcademicYear(AcademicYearId::from_uuid(id))).await
}

// Learning types

#[utoipa::path(
    post,
    path = "/api/calendar/learning-types",
    summary = "Create learning type",
    request_body = CreateLearningTypeDto,
    responses(
        (status = 201, description = "Learning type created", body = LearningType),
        (status = 403, description = "Forbidden - secretaries and administrators only"),
        (status = 409, description = "Learning cycle already exists")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_learning_type(
    State(state): State<AppState>,
    RequireCalendarEditor(_auth_user): RequireCalendarEditor,
    ValidatedJson(dto): ValidatedJson<CreateLearningTypeDto>,
) -> Result<(StatusCode, Json<LearningType>), AppError> {
    let learning_type = CalendarService::create_learning_type(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(learning_type)))
}

#[utoipa::path(
    get,
    path = "/api/calendar/learning-types/{id}",
    summary = "Get learning type",
    params(("id" = Uuid, Path, description = "Learning type ID")),
    responses(
        (status = 200, description = "Learning type", body = LearningType),
        (status = 404, description = "Learning type not found")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_learning_type(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LearningType>, AppError> {
    let learning_type =
        CalendarService::get_learning_type(state.store.as_ref(), LearningTypeId::from_uuid(id))
            .await?;
    Ok(Json(learning_type))
}

/// Learning type with its study year, group and discipline counts
#[utoipa::path(
    get,
    path = "/api/calendar/learning-types/{id}/stats",
    summary = "Get learning type stats",
    params(("id" = Uuid, Path, description = "Learning type ID")),
    responses(
        (status = 200, description = "Learning type with counts", body = LearningTypeWithStats),
        (status = 404, description = "Learning type not found")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_learning_type_stats(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LearningTypeWithStats>, AppError> {
    let stats =
        CalendarService::learning_type_stats(state.store.as_ref(), LearningTypeId::from_uuid(id))
            .await?;
    Ok(Json(stats))
}

#[utoipa::path(
    delete,
    path = "/api/calendar/learning-types/{id}",
    summary = "Delete learning type",
    params(("id" = Uuid, Path, description = "Learning type ID")),
    responses(
        (status = 204, description = "Learning type deleted"),
        (status = 404, description = "Learning type not found"),
        (status = 409, description = "Learning type is still referenced")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_learning_type(
    State(state): State<AppState>,
    RequireCalendarEditor(_auth_user): RequireCalendarEditor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_node(&state, CalendarNode::LearningType(LearningTypeId::from_uuid(id))).await
}

// Study years

#[utoipa::path(
    post,
    path = "/api/calendar/study-years",
    summary = "Create study year",
    request_body = CreateStudyYearDto,
    responses(
        (status = 201, description = "Study year created", body = StudyYear),
        (status = 403, description = "Forbidden - secretaries and administrators only"),
        (status = 409, description = "Study year already exists for the learning type"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_study_year(
    State(state): State<AppState>,
    RequireCalendarEditor(_auth_user): RequireCalendarEditor,
    ValidatedJson(dto): ValidatedJson<CreateStudyYearDto>,
) -> Result<(StatusCode, Json<StudyYear>), AppError> {
    let study_year = CalendarService::create_study_year(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(study_year)))
}

#[utoipa::path(
    get,
    path = "/api/calendar/study-years/{id}",
    summary = "Get study year",
    params(("id" = Uuid, Path, description = "Study year ID")),
    responses(
        (status = 200, description = "Study year", body = StudyYear),
        (status = 404, description = "Study year not found")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_study_year(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StudyYear>, AppError> {
    let study_year =
        CalendarService::get_study_year(state.store.as_ref(), StudyYearId::from_uuid(id)).await?;
    Ok(Json(study_year))
}

#[utoipa::path(
    delete,
    path = "/api/calendar/study-years/{id}",
    summary = "Delete study year",
    params(("id" = Uuid, Path, description = "Study year ID")),
    responses(
        (status = 204, description = "Study year deleted"),
        (status = 404, description = "Study year not found"),
        (status = 409, description = "Study year is still referenced")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_study_year(
    State(state): State<AppState>,
    RequireCalendarEditor(_auth_user): RequireCalendarEditor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_node(&state, CalendarNode::StudyYear(StudyYearId::from_uuid(id))).await
}

// Groups

#[utoipa::path(
    post,
    path = "/api/calendar/groups",
    summary = "Create group",
    request_body = CreateGroupDto,
    responses(
        (status = 201, description = "Group created", body = Group),
        (status = 403, description = "Forbidden - secretaries and administrators only"),
        (status = 409, description = "Group name already used in the study year"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_group(
    State(state): State<AppState>,
    RequireCalendarEditor(_auth_user): RequireCalendarEditor,
    ValidatedJson(dto): ValidatedJson<CreateGroupDto>,
) -> Result<(StatusCode, Json<Group>), AppError> {
    let group = CalendarService::create_group(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/api/calendar/groups/{id}",
    summary = "Get group",
    params(("id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group", body = Group),
        (status = 404, description = "Group not found")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_group(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Group>, AppError> {
    let group = CalendarService::get_group(state.store.as_ref(), GroupId::from_uuid(id)).await?;
    Ok(Json(group))
}

#[utoipa::path(
    delete,
    path = "/api/calendar/groups/{id}",
    summary = "Delete group",
    params(("id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 404, description = "Group not found"),
        (status = 409, description = "Group still attends events")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_group(
    State(state): State<AppState>,
    RequireCalendarEditor(_auth_user): RequireCalendarEditor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_node(&state, CalendarNode::Group(GroupId::from_uuid(id))).await
}

// Disciplines

#[utoipa::path(
    post,
    path = "/api/calendar/disciplines",
    summary = "Create discipline",
    request_body = CreateDisciplineDto,
    responses(
        (status = 201, description = "Discipline created", body = Discipline),
        (status = 403, description = "Forbidden - secretaries and administrators only"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_discipline(
    State(state): State<AppState>,
    RequireCalendarEditor(_auth_user): RequireCalendarEditor,
    ValidatedJson(dto): ValidatedJson<CreateDisciplineDto>,
) -> Result<(StatusCode, Json<Discipline>), AppError> {
    let discipline = CalendarService::create_discipline(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(discipline)))
}

#[utoipa::path(
    get,
    path = "/api/calendar/disciplines/{id}",
    summary = "Get discipline",
    params(("id" = Uuid, Path, description = "Discipline ID")),
    responses(
        (status = 200, description = "Discipline", body = Discipline),
        (status = 404, description = "Discipline not found")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_discipline(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Discipline>, AppError> {
    let discipline =
        CalendarService::get_discipline(state.store.as_ref(), DisciplineId::from_uuid(id)).await?;
    Ok(Json(discipline))
}

#[utoipa::path(
    delete,
    path = "/api/calendar/disciplines/{id}",
    summary = "Delete discipline",
    params(("id" = Uuid, Path, description = "Discipline ID")),
    responses(
        (status = 204, description = "Discipline deleted"),
        (status = 404, description = "Discipline not found"),
        (status = 409, description = "Discipline still has events")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_discipline(
    State(state): State<AppState>,
    RequireCalendarEditor(_auth_user): RequireCalendarEditor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_node(&state, CalendarNode::Discipline(DisciplineId::from_uuid(id))).await
}

// Teachers

#[utoipa::path(
    post,
    path = "/api/calendar/teachers",
    summary = "Create teacher",
    request_body = CreateTeacherDto,
    responses(
        (status = 201, description = "Teacher created", body = Teacher),
        (status = 403, description = "Forbidden - secretaries and administrators only"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_teacher(
    State(state): State<AppState>,
    RequireCalendarEditor(auth_user): RequireCalendarEditor,
    ValidatedJson(dto): ValidatedJson<CreateTeacherDto>,
) -> Result<(StatusCode, Json<Teacher>), AppError> {
    let teacher =
        CalendarService::create_teacher(state.store.as_ref(), auth_user.principal(), dto).await?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

#[utoipa::path(
    get,
    path = "/api/calendar/teachers/{id}",
    summary = "Get teacher",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher", body = Teacher),
        (status = 404, description = "Teacher not found")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_teacher(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Teacher>, AppError> {
    let teacher =
        CalendarService::get_teacher(state.store.as_ref(), TeacherId::from_uuid(id)).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    delete,
    path = "/api/calendar/teachers/{id}",
    summary = "Delete teacher",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 204, description = "Teacher deleted"),
        (status = 404, description = "Teacher not found"),
        (status = 409, description = "Teacher still has events or disciplines")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_teacher(
    State(state): State<AppState>,
    RequireCalendarEditor(_auth_user): RequireCalendarEditor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_node(&state, CalendarNode::Teacher(TeacherId::from_uuid(id))).await
}

// Classrooms

#[utoipa::path(
    post,
    path = "/api/calendar/classrooms",
    summary = "Create classroom",
    request_body = CreateClassroomDto,
    responses(
        (status = 201, description = "Classroom created", body = Classroom),
        (status = 403, description = "Forbidden - secretaries and administrators only"),
        (status = 409, description = "Classroom name already used"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_classroom(
    State(state): State<AppState>,
    RequireCalendarEditor(auth_user): RequireCalendarEditor,
    ValidatedJson(dto): ValidatedJson<CreateClassroomDto>,
) -> Result<(StatusCode, Json<Classroom>), AppError> {
    let classroom =
        CalendarService::create_classroom(state.store.as_ref(), auth_user.principal(), dto)
            .await?;
    Ok((StatusCode::CREATED, Json(classroom)))
}

#[utoipa::path(
    get,
    path = "/api/calendar/classrooms/{id}",
    summary = "Get classroom",
    params(("id" = Uuid, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Classroom", body = Classroom),
        (status = 404, description = "Classroom not found")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_classroom(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Classroom>, AppError> {
    let classroom =
        CalendarService::get_classroom(state.store.as_ref(), ClassroomId::from_uuid(id)).await?;
    Ok(Json(classroom))
}

#[utoipa::path(
    delete,
    path = "/api/calendar/classrooms/{id}",
    summary = "Delete classroom",
    params(("id" = Uuid, Path, description = "Classroom ID")),
    responses(
        (status = 204, description = "Classroom deleted"),
        (status = 404, description = "Classroom not found"),
        (status = 409, description = "Classroom still has events")
    ),
    tag = "Calendar",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_classroom(
    State(state): State<AppState>,
    RequireCalendarEditor(_auth_user): RequireCalendarEditor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_node(&state, CalendarNode::Classroom(ClassroomId::from_uuid(id))).await
}
