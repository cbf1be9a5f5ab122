//! # Orar API
//!
//! Backend for a university timetable: schedule events on a weekly grid,
//! their approval workflow, and the calendar reference data they hang off.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── cli/              # seed-calendar, issue-token
//! ├── middleware/       # AuthUser / StreamUser extractors and role gates
//! ├── modules/          # Feature modules
//! │   ├── events/      # Event CRUD, move, approval workflow, bulk submit
//! │   ├── calendar/    # Academic years, cycles, study years, groups, ...
//! │   └── notifications/ # Stored notifications, realtime hub, SSE
//! ├── store/            # Repository traits, PostgreSQL and in-memory stores
//! ├── docs.rs           # OpenAPI document
//! ├── logging.rs        # tracing setup and request logging
//! └── metrics.rs        # Prometheus metrics
//! ```
//!
//! Each feature module has a `controller.rs` (HTTP handlers), `service.rs`
//! (business logic over a [`store::ScheduleStore`]), `model.rs` and
//! `router.rs`.
//!
//! ## Event workflow
//!
//! | From | Action | Roles | To |
//! |------|--------|-------|----|
//! | DRAFT, REJECTED | submit | PROFESOR (own events) | PENDING_APPROVAL |
//! | PENDING_APPROVAL | approve | SECRETAR, ADMIN | APPROVED |
//! | PENDING_APPROVAL, APPROVED | reject | SECRETAR, ADMIN | REJECTED |
//! | PENDING_APPROVAL, APPROVED | publish | SECRETAR, ADMIN | PUBLISHED |
//! | DRAFT, REJECTED | publish | ADMIN | PUBLISHED |
//!
//! The table itself lives in [`modules::events::workflow`].
//!
//! ## Crates
//!
//! - `orar-core`: [`AppError`](orar_core::AppError) and error codes
//! - `orar-config`: environment configuration
//! - `orar-db`: connection pool and migrations
//! - `orar-auth`: JWT claims, signing and verification
//! - `orar-models`: domain types and DTOs

pub mod cli;
pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod store;
pub mod validator;

pub use router::init_router;
pub use state::AppState;
