//! Academic calendar reference data.
//!
//! The hierarchy is `AcademicYear` and `LearningType → StudyYear → Group /
//! Discipline`, plus the `Teacher` and `Classroom` reference entities. Events
//! attach to these nodes; none of them can be deleted while an event still
//! depends on it.

use crate::ids::{
    AcademicYearId, ClassroomId, DisciplineId, GroupId, LearningTypeId, StudyYearId, TeacherId,
    UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// An academic year such as 2025-2026.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AcademicYear {
    pub id: AcademicYearId,
    pub start_year: i32,
    pub end_year: i32,
    /// Whether the year's timetable is visible to students
    pub published: bool,
    pub created_by_id: Option<UserId>,
    pub updated_by_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AcademicYear {
    pub fn label(&self) -> String {
        format!("{}-{}", self.start_year, self.end_year)
    }
}

/// A teaching cycle, e.g. "Licență" or "Master".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LearningType {
    pub id: LearningTypeId,
    pub learning_cycle: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Learning type with aggregate counts for listing views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LearningTypeWithStats {
    #[serde(flatten)]
    pub learning_type: LearningType,
    pub study_year_count: i64,
    pub group_count: i64,
    pub discipline_count: i64,
}

/// A numbered year (1..6) within a learning type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StudyYear {
    pub id: StudyYearId,
    pub year: i16,
    pub learning_type_id: LearningTypeId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cohort of students within a study year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub group_number: i16,
    pub semester: i16,
    pub study_year_id: StudyYearId,
    pub learning_type_id: LearningTypeId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Discipline {
    pub id: DisciplineId,
    pub name: String,
    pub semester: i16,
    pub teacher_id: TeacherId,
    pub study_year_id: StudyYearId,
    pub learning_type_id: LearningTypeId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Teacher {
    pub id: TeacherId,
    /// Display name, including academic title
    pub name: String,
    pub email: Option<String>,
    /// Login account linked to this profile, if any
    pub user_id: Option<UserId>,
    pub created_by_id: Option<UserId>,
    pub updated_by_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Classroom {
    pub id: ClassroomId,
    pub name: String,
    pub capacity: Option<i32>,
    pub created_by_id: Option<UserId>,
    pub updated_by_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A node of the calendar hierarchy that events can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarNode {
    AcademicYear(AcademicYearId),
    LearningType(LearningTypeId),
    StudyYear(StudyYearId),
    Group(GroupId),
    Discipline(DisciplineId),
    Teacher(TeacherId),
    Classroom(ClassroomId),
}

impl CalendarNode {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AcademicYear(_) => "Academic year",
            Self::LearningType(_) => "Learning type",
            Self::StudyYear(_) => "Study year",
            Self::Group(_) => "Group",
            Self::Discipline(_) => "Discipline",
            Self::Teacher(_) => "Teacher",
            Self::Classroom(_) => "Classroom",
        }
    }

    pub const fn uuid(&self) -> Uuid {
        match self {
            Self::AcademicYear(id) => id.into_inner(),
            Self::LearningType(id) => id.into_inner(),
            Self::StudyYear(id) => id.into_inner(),
            Self::Group(id) => id.into_inner(),
            Self::Discipline(id) => id.into_inner(),
            Self::Teacher(id) => id.into_inner(),
            Self::Classroom(id) => id.into_inner(),
        }
    }
}

impl fmt::Display for CalendarNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label(), self.uuid())
    }
}

// DTOs

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_year_span"))]
pub struct CreateAcademicYearDto {
    #[validate(range(min = 2000, max = 2100, message = "Start year must be between 2000 and 2100"))]
    pub start_year: i32,
    #[validate(range(min = 2000, max = 2100, message = "End year must be between 2000 and 2100"))]
    pub end_year: i32,
    #[serde(default)]
    pub published: bool,
}

fn validate_year_span(dto: &CreateAcademicYearDto) -> Result<(), ValidationError> {
    if dto.start_year >= dto.end_year {
        return Err(ValidationError::new("year_span")
            .with_message("Start year must be before end year".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLearningTypeDto {
    #[validate(length(min = 1, max = 100, message = "Learning cycle must be between 1 and 100 characters"))]
    pub learning_cycle: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStudyYearDto {
    #[validate(range(min = 1, max = 6, message = "Study year must be between 1 and 6"))]
    pub year: i16,
    pub learning_type_id: LearningTypeId,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateGroupDto {
    #[validate(length(min = 1, max = 50, message = "Group name must be between 1 and 50 characters"))]
    pub name: String,
    #[validate(range(min = 1, message = "Group number must be positive"))]
    pub group_number: i16,
    #[validate(range(min = 1, max = 2, message = "Semester must be 1 or 2"))]
    pub semester: i16,
    pub study_year_id: StudyYearId,
    pub learning_type_id: LearningTypeId,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDisciplineDto {
    #[validate(length(min = 1, max = 200, message = "Discipline name must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(range(min = 1, max = 2, message = "Semester must be 1 or 2"))]
    pub semester: i16,
    pub teacher_id: TeacherId,
    pub study_year_id: StudyYearId,
    pub learning_type_id: LearningTypeId,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTeacherDto {
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters"))]
    pub name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClassroomDto {
    #[validate(length(min = 1, max = 50, message = "Classroom name must be between 1 and 50 characters"))]
    pub name: String,
    #[validate(range(min = 1, message = "Capacity must be positive"))]
    pub capacity: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_academic_year_span_validation() {
        let valid = CreateAcademicYearDto {
            start_year: 2025,
            end_year: 2026,
            published: false,
        };
        assert!(valid.validate().is_ok());

        let inverted = CreateAcademicYearDto {
            start_year: 2026,
            end_year: 2025,
            published: false,
        };
        assert!(inverted.validate().is_err());

        let same = CreateAcademicYearDto {
            start_year: 2025,
            end_year: 2025,
            published: false,
        };
        assert!(same.validate().is_err());
    }

    #[test]
    fn test_study_year_range() {
        let learning_type_id = LearningTypeId::new();
        for year in 1..=6 {
            let dto = CreateStudyYearDto {
                year,
                learning_type_id,
            };
            assert!(dto.validate().is_ok(), "year {} should be valid", year);
        }
        for year in [0, 7] {
            let dto = CreateStudyYearDto {
                year,
                learning_type_id,
            };
            assert!(dto.validate().is_err(), "year {} should be invalid", year);
        }
    }

    #[test]
    fn test_group_semester_must_be_one_or_two() {
        let dto = CreateGroupDto {
            name: "311".to_string(),
            group_number: 1,
            semester: 3,
            study_year_id: StudyYearId::new(),
            learning_type_id: LearningTypeId::new(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_teacher_email_optional_but_checked() {
        let without = CreateTeacherDto {
            name: "Prof. dr. Ana Popescu".to_string(),
            email: None,
            user_id: None,
        };
        assert!(without.validate().is_ok());

        let invalid = CreateTeacherDto {
            name: "Prof. dr. Ana Popescu".to_string(),
            email: Some("not-an-email".to_string()),
            user_id: None,
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_calendar_node_display() {
        let id = GroupId::from_u128(7);
        let node = CalendarNode::Group(id);
        assert_eq!(node.label(), "Group");
        assert!(node.to_string().starts_with("Group "));
    }
}
