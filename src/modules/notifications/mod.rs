//! Persisted notifications and their live delivery.
//!
//! - [`sink`]: the capability the workflow uses to notify users
//! - [`hub`]: per-user broadcast channels behind the SSE stream

pub mod controller;
pub mod hub;
pub mod model;
pub mod router;
pub mod service;
pub mod sink;
