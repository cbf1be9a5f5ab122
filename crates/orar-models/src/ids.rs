//! Typed identifiers.
//!
//! Every table keys its rows by a UUID; each gets its own newtype so a
//! `GroupId` cannot be passed where an `EventId` is expected. On the wire
//! and in PostgreSQL they are plain UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        #[schema(value_type = String, format = "uuid")]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Fixed ids for tests and seed data.
            pub const fn from_u128(v: u128) -> Self {
                Self(Uuid::from_u128(v))
            }

            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

define_id!(
    /// Strongly-typed ID for User entities.
    UserId
);

define_id!(
    /// Strongly-typed ID for AcademicYear entities.
    AcademicYearId
);

define_id!(
    /// Strongly-typed ID for LearningType entities.
    LearningTypeId
);

define_id!(
    /// Strongly-typed ID for StudyYear entities.
    StudyYearId
);

define_id!(
    /// Strongly-typed ID for Group entities.
    GroupId
);

define_id!(
    /// Strongly-typed ID for Discipline entities.
    DisciplineId
);

define_id!(
    /// Strongly-typed ID for Teacher entities.
    TeacherId
);

define_id!(
    /// Strongly-typed ID for Classroom entities.
    ClassroomId
);

define_id!(
    /// Strongly-typed ID for Event entities.
    EventId
);

define_id!(
    /// Strongly-typed ID for Notification entities.
    NotificationId
);
