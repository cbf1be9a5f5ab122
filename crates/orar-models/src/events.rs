//! Schedule event aggregate and its DTOs.
//!
//! An event is one teaching session on the weekly grid, bound to a single
//! teacher, discipline, classroom and academic year, and attended by one or
//! more groups through the `event_groups` join table.

use crate::hour::HourOfDay;
use crate::ids::{
    AcademicYearId, ClassroomId, DisciplineId, EventId, GroupId, LearningTypeId, TeacherId, UserId,
};
use crate::schedule::{Day, EventStatus, EventType, Recurrence};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Longest accepted rejection reason, in characters.
pub const MAX_REJECTION_REASON_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: EventId,
    pub day: Day,
    pub start_hour: HourOfDay,
    pub end_hour: HourOfDay,
    pub event_type: EventType,
    pub event_recurrence: Recurrence,
    pub semester: i16,
    pub status: EventStatus,
    /// Only present while the event is `REJECTED`
    pub rejection_reason: Option<String>,
    pub approved_by_id: Option<UserId>,
    pub approved_at: Option<DateTime<Utc>>,
    pub published_by_id: Option<UserId>,
    pub published_at: Option<DateTime<Utc>>,
    pub academic_year_id: AcademicYearId,
    pub learning_type_id: LearningTypeId,
    pub teacher_id: TeacherId,
    pub discipline_id: DisciplineId,
    pub classroom_id: ClassroomId,
    pub created_by_id: Option<UserId>,
    pub updated_by_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Length of the session in whole hours.
    pub fn duration_hours(&self) -> Option<u8> {
        self.start_hour.hours_until(self.end_hour)
    }
}

/// An event together with the groups attending it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventWithGroups {
    #[serde(flatten)]
    pub event: Event,
    pub group_ids: Vec<GroupId>,
}

/// Typed scalar fields written by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub day: Day,
    pub start_hour: HourOfDay,
    pub end_hour: HourOfDay,
    pub event_type: EventType,
    pub event_recurrence: Recurrence,
    pub semester: i16,
    pub academic_year_id: AcademicYearId,
    pub learning_type_id: LearningTypeId,
    pub teacher_id: TeacherId,
    pub discipline_id: DisciplineId,
    pub classroom_id: ClassroomId,
}

// DTOs

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEventDto {
    pub day: Day,
    #[validate(custom(function = "validate_grid_hour"))]
    #[schema(example = "10:00")]
    pub start_hour: String,
    #[validate(custom(function = "validate_grid_hour"))]
    #[schema(example = "12:00")]
    pub end_hour: String,
    pub event_type: EventType,
    pub event_recurrence: Recurrence,
    #[validate(range(min = 1, max = 2, message = "Semester must be 1 or 2"))]
    pub semester: i16,
    pub academic_year_id: AcademicYearId,
    pub learning_type_id: LearningTypeId,
    pub teacher_id: TeacherId,
    pub discipline_id: DisciplineId,
    pub classroom_id: ClassroomId,
    #[validate(custom(function = "validate_group_ids"))]
    pub group_ids: Vec<String>,
    /// Initial status; omitted means `DRAFT`
    #[serde(default)]
    pub status: Option<EventStatus>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateEventDto {
    pub day: Day,
    #[validate(custom(function = "validate_grid_hour"))]
    pub start_hour: String,
    #[validate(custom(function = "validate_grid_hour"))]
    pub end_hour: String,
    pub event_type: EventType,
    pub event_recurrence: Recurrence,
    #[validate(range(min = 1, max = 2, message = "Semester must be 1 or 2"))]
    pub semester: i16,
    pub academic_year_id: AcademicYearId,
    pub learning_type_id: LearningTypeId,
    pub teacher_id: TeacherId,
    pub discipline_id: DisciplineId,
    pub classroom_id: ClassroomId,
    #[validate(custom(function = "validate_group_ids"))]
    pub group_ids: Vec<String>,
}

/// Fields shared by the create and update payloads.
pub trait EventPayload {
    fn start_hour(&self) -> &str;
    fn end_hour(&self) -> &str;
    fn raw_group_ids(&self) -> &[String];
    fn fields(&self, start_hour: HourOfDay, end_hour: HourOfDay) -> EventFields;

    /// Non-blank group ids in request order, without duplicates.
    fn group_ids(&self) -> Vec<GroupId> {
        let mut ids: Vec<GroupId> = Vec::new();
        for id in self
            .raw_group_ids()
            .iter()
            .filter_map(|raw| raw.trim().parse::<GroupId>().ok())
        {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

macro_rules! impl_event_payload {
    ($dto:ty) => {
        impl EventPayload for $dto {
            fn start_hour(&self) -> &str {
                &self.start_hour
            }

            fn end_hour(&self) -> &str {
                &self.end_hour
            }

            fn raw_group_ids(&self) -> &[String] {
                &self.group_ids
            }

            fn fields(&self, start_hour: HourOfDay, end_hour: HourOfDay) -> EventFields {
                EventFields {
                    day: self.day,
                    start_hour,
                    end_hour,
                    event_type: self.event_type,
                    event_recurrence: self.event_recurrence,
                    semester: self.semester,
                    academic_year_id: self.academic_year_id,
                    learning_type_id: self.learning_type_id,
                    teacher_id: self.teacher_id,
                    discipline_id: self.discipline_id,
                    classroom_id: self.classroom_id,
                }
            }
        }
    };
}

impl_event_payload!(CreateEventDto);
impl_event_payload!(UpdateEventDto);

fn validate_grid_hour(value: &str) -> Result<(), ValidationError> {
    value.parse::<HourOfDay>().map(|_| ()).map_err(|err| {
        ValidationError::new("hour").with_message(err.to_string().into())
    })
}

fn validate_group_ids(ids: &[String]) -> Result<(), ValidationError> {
    let mut present = ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty());

    let Some(first) = present.next() else {
        return Err(ValidationError::new("required")
            .with_message("At least one group is required".into()));
    };

    if std::iter::once(first)
        .chain(present)
        .any(|id| id.parse::<GroupId>().is_err())
    {
        return Err(ValidationError::new("uuid")
            .with_message("Group ids must be valid UUIDs".into()));
    }

    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MoveEventDto {
    pub day: Day,
    #[validate(custom(function = "validate_grid_hour"))]
    #[schema(example = "14:00")]
    pub start_hour: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RejectEventDto {
    #[validate(custom(function = "validate_rejection_reason"))]
    pub reason: String,
}

fn validate_rejection_reason(reason: &str) -> Result<(), ValidationError> {
    let len = reason.trim().chars().count();
    if len == 0 {
        return Err(ValidationError::new("required")
            .with_message("A rejection reason is required".into()));
    }
    if len > MAX_REJECTION_REASON_LEN {
        return Err(ValidationError::new("length").with_message(
            format!("Rejection reason must be at most {MAX_REJECTION_REASON_LEN} characters").into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EventFilterParams {
    pub teacher_id: Option<TeacherId>,
    pub status: Option<EventStatus>,
    pub group_id: Option<GroupId>,
    pub academic_year_id: Option<AcademicYearId>,
    pub semester: Option<i16>,
    pub day: Option<Day>,
}

impl EventFilterParams {
    pub fn matches(&self, event: &EventWithGroups) -> bool {
        let e = &event.event;
        self.teacher_id.is_none_or(|id| e.teacher_id == id)
            && self.status.is_none_or(|status| e.status == status)
            && self
                .group_id
                .is_none_or(|id| event.group_ids.contains(&id))
            && self
                .academic_year_id
                .is_none_or(|id| e.academic_year_id == id)
            && self.semester.is_none_or(|semester| e.semester == semester)
            && self.day.is_none_or(|day| e.day == day)
    }
}

/// Outcome of a teacher's bulk submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BulkPublishResult {
    /// Drafts moved to `PENDING_APPROVAL` by this call
    pub published_count: u64,
    /// Drafts and already pending events found for the teacher
    pub total_events: u64,
    /// Secretaries that received a notification
    pub notified_count: u64,
    pub failed_notifications: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto(group_ids: Vec<&str>) -> CreateEventDto {
        CreateEventDto {
            day: Day::Luni,
            start_hour: "10:00".to_string(),
            end_hour: "12:00".to_string(),
            event_type: EventType::Course,
            event_recurrence: Recurrence::Toate,
            semester: 1,
            academic_year_id: AcademicYearId::new(),
            learning_type_id: LearningTypeId::new(),
            teacher_id: TeacherId::new(),
            discipline_id: DisciplineId::new(),
            classroom_id: ClassroomId::new(),
            group_ids: group_ids.into_iter().map(str::to_string).collect(),
            status: None,
        }
    }

    const G1: &str = "00000000-0000-0000-0000-000000000001";
    const G2: &str = "00000000-0000-0000-0000-000000000002";

    #[test]
    fn test_group_ids_required_after_trimming() {
        assert!(create_dto(vec![]).validate().is_err());
        assert!(create_dto(vec!["", "   "]).validate().is_err());
        assert!(create_dto(vec![G1]).validate().is_ok());
        assert!(create_dto(vec![" ", G1]).validate().is_ok());
    }

    #[test]
    fn test_group_ids_must_be_uuids() {
        let errors = create_dto(vec![G1, "group-a"]).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("group_ids"));
    }

    #[test]
    fn test_group_ids_are_trimmed_and_deduplicated() {
        let padded = format!(" {G2} ");
        let dto = create_dto(vec![G2, " ", G1, padded.as_str()]);
        assert_eq!(
            dto.group_ids(),
            vec![GroupId::from_u128(2), GroupId::from_u128(1)]
        );
    }

    #[test]
    fn test_hours_must_be_on_grid() {
        let mut dto = create_dto(vec![G1]);
        dto.start_hour = "10:30".to_string();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("start_hour"));
    }

    #[test]
    fn test_semester_range() {
        let mut dto = create_dto(vec![G1]);
        dto.semester = 0;
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_rejection_reason_bounds() {
        let blank = RejectEventDto {
            reason: "   ".to_string(),
        };
        assert!(blank.validate().is_err());

        let long = RejectEventDto {
            reason: "x".repeat(MAX_REJECTION_REASON_LEN + 1),
        };
        assert!(long.validate().is_err());

        let padded = RejectEventDto {
            reason: format!("  {}  ", "x".repeat(MAX_REJECTION_REASON_LEN)),
        };
        assert!(padded.validate().is_ok());
    }

    #[test]
    fn test_create_dto_status_defaults_to_none() {
        let json = serde_json::json!({
            "day": "LUNI",
            "start_hour": "10:00",
            "end_hour": "12:00",
            "event_type": "C",
            "event_recurrence": "toate",
            "semester": 1,
            "academic_year_id": G1,
            "learning_type_id": G1,
            "teacher_id": G1,
            "discipline_id": G1,
            "classroom_id": G1,
            "group_ids": [G1, G2]
        });
        let dto: CreateEventDto = serde_json::from_value(json).unwrap();
        assert!(dto.status.is_none());
        assert_eq!(dto.group_ids().len(), 2);
    }

    #[test]
    fn test_filter_matches_group_membership() {
        let group = GroupId::from_u128(1);
        let filter = EventFilterParams {
            group_id: Some(group),
            ..Default::default()
        };
        let dto = create_dto(vec![G1]);
        let now = Utc::now();
        let event = EventWithGroups {
            event: Event {
                id: EventId::new(),
                day: dto.day,
                start_hour: HourOfDay::new(10).unwrap(),
                end_hour: HourOfDay::new(12).unwrap(),
                event_type: dto.event_type,
                event_recurrence: dto.event_recurrence,
                semester: 1,
                status: EventStatus::Draft,
                rejection_reason: None,
                approved_by_id: None,
                approved_at: None,
                published_by_id: None,
                published_at: None,
                academic_year_id: dto.academic_year_id,
                learning_type_id: dto.learning_type_id,
                teacher_id: dto.teacher_id,
                discipline_id: dto.discipline_id,
                classroom_id: dto.classroom_id,
                created_by_id: None,
                updated_by_id: None,
                created_at: now,
                updated_at: now,
            },
            group_ids: vec![group],
        };
        assert!(filter.matches(&event));
        assert_eq!(event.event.duration_hours(), Some(2));

        let other = EventFilterParams {
            group_id: Some(GroupId::from_u128(9)),
            ..Default::default()
        };
        assert!(!other.matches(&event));
    }
}
