use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_academic_year, create_classroom, create_discipline, create_group,
    create_learning_type, create_study_year, create_teacher, delete_academic_year,
    delete_classroom, delete_discipline, delete_group, delete_learning_type, delete_study_year,
    delete_teacher, get_academic_year, get_classroom, get_discipline, get_group,
    get_learning_type, get_learning_type_stats, get_study_year, get_teacher,
};

/// Routes: POST /<kind>, GET|DELETE /<kind>/{id} for every hierarchy node,
/// plus GET /learning-types/{id}/stats
pub fn init_calendar_router() -> Router<AppState> {
    Router::new()
        .route("/academic-years", post(create_academic_year))
        .route(
            "/academic-years/{id}",
            get(get_academic_year).delete(delete_academic_year),
        )
        .route("/learning-types", post(create_learning_type))
        .route(
            "/learning-types/{id}",
            get(get_learning_type).delete(delete_learning_type),
        )
        .route("/learning-types/{id}/stats", get(get_learning_type_stats))
        .route("/study-years", post(create_study_year))
        .route(
            "/study-years/{id}",
            get(get_study_year).delete(delete_study_year),
        )
        .route("/groups", post(create_group))
        .route("/groups/{id}", get(get_group).delete(delete_group))
        .route("/disciplines", post(create_discipline))
        .route(
            "/disciplines/{id}",
            get(get_discipline).delete(delete_discipline),
        )
        .route("/teachers", post(create_teacher))
        .route("/teachers/{id}", get(get_teacher).delete(delete_teacher))
        .route("/classrooms", post(create_classroom))
        .route(
            "/classrooms/{id}",
            get(get_classroom).delete(delete_classroom),
        )
}
