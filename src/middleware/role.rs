//! Role gates for handlers.
//!
//! Each gate is an extractor that authenticates the caller and then checks
//! the role against a fixed list. Workflow actions (approve, reject,
//! publish, submit) are not gated here; the transition table decides.

use orar_models::users::UserRole;

pub const EVENT_EDITORS: &[UserRole] = &[UserRole::Profesor, UserRole::Secretar, UserRole::Admin];
pub const CALENDAR_EDITORS: &[UserRole] = &[UserRole::Secretar, UserRole::Admin];

/// Generates an extractor that only admits the listed roles.
#[macro_export]
macro_rules! require_roles {
    ($name:ident, $roles:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = orar_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = <$crate::middleware::auth::AuthUser as axum::extract::FromRequestParts<
                    $crate::state::AppState,
                >>::from_request_parts(parts, state)
                .await?;

                let allowed: &[orar_models::users::UserRole] = $roles;
                if !auth_user.principal().has_any_role(allowed) {
                    return Err(orar_core::AppError::forbidden(format!(
                        "Access denied for role {}",
                        auth_user.role()
                    )));
                }

                Ok($name(auth_user))
            }
        }
    };
}

require_roles!(RequireEventEditor, EVENT_EDITORS);
require_roles!(RequireCalendarEditor, CALENDAR_EDITORS);
require_roles!(RequireAdmin, &[UserRole::Admin]);
require_roles!(RequireProfesor, &[UserRole::Profesor]);
