//! Administrative commands behind `orar-cli`.
//!
//! Seeding goes through the same services as the API, so it works against
//! any [`ScheduleStore`]. It only creates what is missing and can be run
//! repeatedly.

use chrono::{Datelike, NaiveDate};
use tracing::info;

use orar_config::JwtConfig;
use orar_core::AppError;
use orar_models::calendar::{CreateAcademicYearDto, CreateLearningTypeDto, CreateStudyYearDto};
use orar_models::users::{Principal, UserRole};

use crate::modules::calendar::service::CalendarService;
use crate::store::ScheduleStore;
use crate::store::postgres::PgStore;

/// Learning cycles and how many study years each one has.
pub const DEFAULT_LEARNING_CYCLES: &[(&str, i16)] = &[("Licență", 3), ("Master", 2)];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub academic_years_created: u32,
    pub learning_types_created: u32,
    pub study_years_created: u32,
}

/// Academic years start in September.
pub fn academic_year_span(today: NaiveDate) -> (i32, i32) {
    let year = today.year();
    if today.month() >= 9 {
        (year, year + 1)
    } else {
        (year - 1, year)
    }
}

/// Creates the academic year containing `today` and the default learning
/// cycles with their study years.
pub async fn seed_calendar(
    store: &dyn ScheduleStore,
    actor: &Principal,
    today: NaiveDate,
) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();

    let (start_year, end_year) = academic_year_span(today);
    if CalendarService::find_academic_year_by_span(store, start_year, end_year)
        .await?
        .is_none()
    {
        let dto = CreateAcademicYearDto {
            start_year,
            end_year,
            published: true,
        };
        CalendarService::create_academic_year(store, actor, dto).await?;
        report.academic_years_created += 1;
    }

    for &(cycle, years) in DEFAULT_LEARNING_CYCLES {
        let learning_type = match CalendarService::find_learning_type_by_cycle(store, cycle).await? {
            Some(existing) => existing,
            None => {
                report.learning_types_created += 1;
                let dto = CreateLearningTypeDto {
                    learning_cycle: cycle.to_string(),
                };
                CalendarService::create_learning_type(store, dto).await?
            }
        };

        for year in 1..=years {
            if store
                .find_study_year_by_number(learning_type.id, year)
                .await?
                .is_some()
            {
                continue;
            }
            let dto = CreateStudyYearDto {
                year,
                learning_type_id: learning_type.id,
            };
            CalendarService::create_study_year(store, dto).await?;
            report.study_years_created += 1;
        }
    }

    info!(?report, "Calendar seeded");
    Ok(report)
}

/// Registers (or refreshes) a directory user and signs an access token
/// for it.
pub async fn issue_token(
    store: &PgStore,
    first_name: &str,
    last_name: &str,
    email: &str,
    role: UserRole,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let user = store
        .upsert_user(first_name, last_name, email, role)
        .await?;
    orar_auth::create_access_token(user.id, &user.email, user.role, jwt_config)
}
