//! Schedule events: CRUD, rescheduling and the approval workflow.

pub mod bulk_publish;
pub mod controller;
pub mod model;
pub mod router;
pub mod service;
pub mod workflow;
