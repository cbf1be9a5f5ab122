//! Shared domain models for the orar timetable service.

pub mod calendar;
pub mod events;
pub mod hour;
pub mod ids;
pub mod notifications;
pub mod schedule;
pub mod users;

pub use hour::HourOfDay;
pub use schedule::{Day, EventStatus, EventType, Recurrence};
pub use users::{Principal, User, UserRole};
