//! # Orar Auth
//!
//! JWT claims and token utilities for the Orar timetable API.
//!
//! - [`claims`]: the access token claim structure
//! - [`jwt`]: token creation and verification

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
