//! Enumerations describing a timetable slot.
//!
//! Wire values follow the faculty's Romanian vocabulary (`LUNI`, `toate`,
//! ...) and map one-to-one onto PostgreSQL enum types of the same name.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Teaching day of the week.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "week_day", rename_all = "UPPERCASE")]
pub enum Day {
    Luni,
    Marti,
    Miercuri,
    Joi,
    Vineri,
}

impl Day {
    pub const ALL: [Day; 5] = [Day::Luni, Day::Marti, Day::Miercuri, Day::Joi, Day::Vineri];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Luni => "LUNI",
            Self::Marti => "MARTI",
            Self::Miercuri => "MIERCURI",
            Self::Joi => "JOI",
            Self::Vineri => "VINERI",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of teaching session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "event_type")]
pub enum EventType {
    /// Curs
    #[serde(rename = "C")]
    #[sqlx(rename = "C")]
    Course,
    /// Seminar
    #[serde(rename = "S")]
    #[sqlx(rename = "S")]
    Seminar,
    /// Laborator
    #[serde(rename = "L")]
    #[sqlx(rename = "L")]
    Laboratory,
    /// Proiect
    #[serde(rename = "P")]
    #[sqlx(rename = "P")]
    Project,
}

/// Week parity on which the session takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "event_recurrence", rename_all = "lowercase")]
pub enum Recurrence {
    /// Every week.
    Toate,
    /// Even weeks only.
    Para,
    /// Odd weeks only.
    Impara,
}

/// Approval workflow status of an event.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "event_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    #[default]
    Draft,
    PendingApproval,
    Approved,
    Rejected,
    Published,
}

impl EventStatus {
    pub const ALL: [EventStatus; 5] = [
        EventStatus::Draft,
        EventStatus::PendingApproval,
        EventStatus::Approved,
        EventStatus::Rejected,
        EventStatus::Published,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::PendingApproval => "PENDING_APPROVAL",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Published => "PUBLISHED",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
