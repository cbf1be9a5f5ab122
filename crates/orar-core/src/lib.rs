//! # Orar Core
//!
//! Core types shared by every Orar crate.
//!
//! - [`errors`]: the [`AppError`] taxonomy with HTTP response conversion
//!
//! # Example
//!
//! ```ignore
//! use orar_core::{AppError, ErrorKind};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Event not found"));
//! assert_eq!(error.kind, ErrorKind::NotFound);
//! ```

pub mod errors;

pub use errors::{AppError, ErrorKind, ErrorResponse};
