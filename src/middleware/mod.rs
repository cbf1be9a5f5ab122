//! Extractors for authentication and role checks.
//!
//! - [`auth`]: `AuthUser` (bearer JWT) and `StreamUser` (bearer or `?token=`)
//! - [`role`]: role-gated extractors generated by `require_roles!`
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::role::RequireCalendarEditor;
//!
//! async fn create_group(
//!     RequireCalendarEditor(auth_user): RequireCalendarEditor,
//! ) -> impl IntoResponse {
//!     // Only SECRETAR and ADMIN reach this point
//! }
//! ```

pub mod auth;
pub mod role;
