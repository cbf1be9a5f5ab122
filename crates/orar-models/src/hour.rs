//! Hour-of-day value type for the hourly timetable grid.
//!
//! Events start and end on whole hours. The wire and database format is a
//! zero-padded `"HH:00"` string; parsing also accepts a single-digit hour
//! (`"8:00"`) and a trailing `":00"` seconds component (`"08:00:00"`).
//!
//! # Example
//!
//! ```ignore
//! use orar_models::hour::HourOfDay;
//!
//! let start: HourOfDay = "10:00".parse().unwrap();
//! let end = start.checked_add(2).unwrap();
//! assert_eq!(end.to_string(), "12:00");
//! assert_eq!(start.hours_until(end), Some(2));
//! ```

use serde::{Deserialize, Serialize, Serializer};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Error returned when a string is not a valid slot on the hourly grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HourError {
    /// The string is not shaped like `HH:MM`.
    Malformed(String),
    /// The minutes component is not `00`.
    OffGrid(String),
    /// The hour is outside `00..=23`.
    OutOfRange(u32),
}

impl std::error::Error for HourError {}

impl fmt::Display for HourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(raw) => write!(f, "'{}' is not a time of day (expected HH:00)", raw),
            Self::OffGrid(raw) => write!(f, "'{}' is not on the hourly grid", raw),
            Self::OutOfRange(hour) => write!(f, "hour {} is outside 00..23", hour),
        }
    }
}

/// A whole hour of the day, `00:00` through `23:00`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema)]
#[schema(value_type = String, example = "10:00")]
pub struct HourOfDay(u8);

impl HourOfDay {
    /// Last representable slot.
    pub const MAX_HOUR: u8 = 23;

    pub fn new(hour: u8) -> Result<Self, HourError> {
        if hour > Self::MAX_HOUR {
            return Err(HourError::OutOfRange(hour as u32));
        }
        Ok(Self(hour))
    }

    #[inline]
    pub const fn hour(self) -> u8 {
        self.0
    }

    /// Shifts the hour forward, `None` when the result leaves the day.
    pub fn checked_add(self, hours: u8) -> Option<Self> {
        self.0
            .checked_add(hours)
            .filter(|h| *h <= Self::MAX_HOUR)
            .map(Self)
    }

    /// Whole hours from `self` to a strictly later `end`.
    pub fn hours_until(self, end: Self) -> Option<u8> {
        if end.0 > self.0 {
            Some(end.0 - self.0)
        } else {
            None
        }
    }

    fn parse(raw: &str) -> Result<Self, HourError> {
        let trimmed = raw.trim();
        let mut parts = trimmed.split(':');

        let hour_part = parts.next().unwrap_or_default();
        let minute_part = parts
            .next()
            .ok_or_else(|| HourError::Malformed(raw.to_string()))?;
        let second_part = parts.next();
        if parts.next().is_some() {
            return Err(HourError::Malformed(raw.to_string()));
        }

        let well_formed = |part: &str| {
            !part.is_empty() && part.len() <= 2 && part.chars().all(|c| c.is_ascii_digit())
        };
        if !well_formed(hour_part) || minute_part.len() != 2 || !well_formed(minute_part) {
            return Err(HourError::Malformed(raw.to_string()));
        }

        if minute_part != "00" || second_part.is_some_and(|s| s != "00") {
            return Err(HourError::OffGrid(raw.to_string()));
        }

        let hour: u32 = hour_part
            .parse()
            .map_err(|_| HourError::Malformed(raw.to_string()))?;
        if hour > Self::MAX_HOUR as u32 {
            return Err(HourError::OutOfRange(hour));
        }

        Ok(Self(hour as u8))
    }
}

impl fmt::Debug for HourOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HourOfDay({:02}:00)", self.0)
    }
}

impl fmt::Display for HourOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

impl FromStr for HourOfDay {
    type Err = HourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for HourOfDay {
    type Error = HourError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl Serialize for HourOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HourOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// Stored as TEXT in "HH:00" form
impl Type<sqlx::Postgres> for HourOfDay {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for HourOfDay {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.to_string(), buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for HourOfDay {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

impl PgHasArrayType for HourOfDay {
    fn array_type_info() -> PgTypeInfo {
        <String as PgHasArrayType>::array_type_info()
    }
}
