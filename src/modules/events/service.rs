use anyhow::anyhow;
use chrono::Utc;
use tracing::{info, instrument};
use validator::{Validate, ValidationError, ValidationErrors};

use orar_core::AppError;
use orar_models::events::{
    CreateEventDto, Event, EventFields, EventFilterParams, EventPayload, EventWithGroups,
    MoveEventDto, RejectEventDto, UpdateEventDto,
};
use orar_models::ids::{EventId, GroupId};
use orar_models::users::{Principal, UserRole};
use orar_models::{EventStatus, HourOfDay};

use crate::metrics::track_transition;
use crate::modules::events::workflow::{self, Action};
use crate::store::{ScheduleStore, StatusChange};

pub struct EventService;

impl EventService {
    #[instrument(skip(store, dto), fields(actor = %actor.id))]
    pub async fn create_event(
        store: &dyn ScheduleStore,
        actor: &Principal,
        dto: CreateEventDto,
    ) -> Result<EventWithGroups, AppError> {
        dto.validate().map_err(|e| AppError::from_validation(&e))?;

        let status = initial_status(dto.status, actor)?;
        let (fields, group_ids) = resolve_payload(store, &dto).await?;

        let created = store
            .insert_event(&fields, status, &group_ids, actor.id)
            .await?;

        info!(
            event_id = %created.event.id,
            status = %created.event.status,
            groups = created.group_ids.len(),
            "Event created"
        );
        Ok(created)
    }

    async fn find(store: &dyn ScheduleStore, id: EventId) -> Result<EventWithGroups, AppError> {
        store
            .find_event(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Event not found")))
    }

    /// Students only ever see published events; anything else reads as
    /// missing to them.
    #[instrument(skip(store), fields(viewer = %viewer.id, role = %viewer.role))]
    pub async fn get_event(
        store: &dyn ScheduleStore,
        viewer: &Principal,
        id: EventId,
    ) -> Result<EventWithGroups, AppError> {
        let event = Self::find(store, id).await?;
        if !can_see(viewer, event.event.status) {
            return Err(AppError::not_found(anyhow!("Event not found")));
        }
        Ok(event)
    }

    #[instrument(skip(store), fields(viewer = %viewer.id, role = %viewer.role))]
    pub async fn list_events(
        store: &dyn ScheduleStore,
        viewer: &Principal,
        mut filters: EventFilterParams,
    ) -> Result<Vec<EventWithGroups>, AppError> {
        if viewer.has_role(UserRole::Student) {
            if filters
                .status
                .is_some_and(|status| status != EventStatus::Published)
            {
                return Ok(Vec::new());
            }
            filters.status = Some(EventStatus::Published);
        }
        store.list_events(&filters).await
    }

    /// Replaces the event's fields and its whole group set. Status and the
    /// approval stamps are left untouched.
    #[instrument(skip(store, dto), fields(actor = %actor.id))]
    pub async fn update_event(
        store: &dyn ScheduleStore,
        actor: &Principal,
        id: EventId,
        dto: UpdateEventDto,
    ) -> Result<EventWithGroups, AppError> {
        dto.validate().map_err(|e| AppError::from_validation(&e))?;

        let existing = Self::find(store, id).await?;
        if existing.event.status == EventStatus::Published && !actor.has_role(UserRole::Admin) {
            return Err(AppError::invalid_state(
                existing.event.status,
                "Published events can only be changed by an administrator",
            ));
        }

        let (fields, group_ids) = resolve_payload(store, &dto).await?;

        let updated = store
            .replace_event(id, &fields, &group_ids, actor.id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Event not found")))?;

        info!(event_id = %id, groups = updated.group_ids.len(), "Event updated");
        Ok(updated)
    }

    #[instrument(skip(store))]
    pub async fn delete_event(store: &dyn ScheduleStore, id: EventId) -> Result<(), AppError> {
        if !store.delete_event(id).await? {
            return Err(AppError::not_found(anyhow!("Event not found")));
        }

        info!(event_id = %id, "Event deleted");
        Ok(())
    }

    /// Moves the event to a new slot keeping its length in hours.
    #[instrument(skip(store, dto), fields(actor = %actor.id))]
    pub async fn move_event(
        store: &dyn ScheduleStore,
        actor: &Principal,
        id: EventId,
        dto: MoveEventDto,
    ) -> Result<Event, AppError> {
        dto.validate().map_err(|e| AppError::from_validation(&e))?;
        let start_hour = parse_hour("start_hour", &dto.start_hour)?;

        let current = Self::find(store, id).await?.event;
        let duration = current.duration_hours().ok_or_else(|| {
            AppError::persistence(anyhow!("Event {} has a non-positive duration", id))
        })?;
        let end_hour = start_hour.checked_add(duration).ok_or_else(|| {
            AppError::field(
                "start_hour",
                format!("A {}h event starting at {} would end after 23:00", duration, start_hour),
            )
        })?;

        let moved = store
            .move_event(id, dto.day, start_hour, end_hour, actor.id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Event not found")))?;

        info!(
            event_id = %id,
            day = %moved.day,
            start_hour = %moved.start_hour,
            end_hour = %moved.end_hour,
            "Event moved"
        );
        Ok(moved)
    }

    pub async fn submit_event(
        store: &dyn ScheduleStore,
        actor: &Principal,
        id: EventId,
    ) -> Result<Event, AppError> {
        Self::transition(store, actor, id, Action::Submit, None).await
    }

    pub async fn approve_event(
        store: &dyn ScheduleStore,
        actor: &Principal,
        id: EventId,
    ) -> Result<Event, AppError> {
        Self::transition(store, actor, id, Action::Approve, None).await
    }

    pub async fn reject_event(
        store: &dyn ScheduleStore,
        actor: &Principal,
        id: EventId,
        dto: RejectEventDto,
    ) -> Result<Event, AppError> {
        dto.validate().map_err(|e| AppError::from_validation(&e))?;
        let reason = dto.reason.trim().to_string();
        Self::transition(store, actor, id, Action::Reject, Some(reason)).await
    }

    pub async fn publish_event(
        store: &dyn ScheduleStore,
        actor: &Principal,
        id: EventId,
    ) -> Result<Event, AppError> {
        Self::transition(store, actor, id, Action::Publish, None).await
    }

    #[instrument(skip(store, reason), fields(actor = %actor.id, role = %actor.role))]
    async fn transition(
        store: &dyn ScheduleStore,
        actor: &Principal,
        id: EventId,
        action: Action,
        reason: Option<String>,
    ) -> Result<Event, AppError> {
        let current = Self::find(store, id).await?.event;
        let rule = workflow::resolve(current.status, action, actor.role)?;

        if rule.owner_only {
            let teacher = store.find_teacher_for_user(actor.id, &actor.email).await?;
            if teacher.is_none_or(|t| t.id != current.teacher_id) {
                return Err(AppError::forbidden(format!(
                    "Only the event's teacher may {} it",
                    action
                )));
            }
        }

        let change = StatusChange {
            from: rule.from,
            to: rule.to,
            actor: actor.id,
            at: Utc::now(),
            approval: rule.approval,
            stamp_publication: rule.stamp_publication,
            rejection_reason: reason.filter(|_| rule.to == EventStatus::Rejected),
        };

        let Some(event) = store.apply_status_change(id, &change).await? else {
            // Someone else moved the event between the read and the write.
            let latest = Self::find(store, id).await?;
            return Err(AppError::invalid_state(
                latest.event.status,
                format!("Cannot {} an event in status {}", action, latest.event.status),
            ));
        };

        track_transition(action.as_str(), event.status.as_str());
        info!(
            event_id = %id,
            action = %action,
            from = %rule.from,
            to = %event.status,
            "Event status changed"
        );
        Ok(event)
    }
}

fn can_see(viewer: &Principal, status: EventStatus) -> bool {
    !viewer.has_role(UserRole::Student) || status == EventStatus::Published
}

fn initial_status(
    requested: Option<EventStatus>,
    actor: &Principal,
) -> Result<EventStatus, AppError> {
    match requested {
        None | Some(EventStatus::Draft) => Ok(EventStatus::Draft),
        Some(EventStatus::PendingApproval) if actor.has_role(UserRole::Admin) => {
            Ok(EventStatus::PendingApproval)
        }
        Some(EventStatus::PendingApproval) => Err(AppError::forbidden(
            "Only administrators may create events directly in PENDING_APPROVAL",
        )),
        Some(other) => Err(AppError::field(
            "status",
            format!("Events cannot be created in status {}", other),
        )),
    }
}

fn parse_hour(field: &str, raw: &str) -> Result<HourOfDay, AppError> {
    raw.parse::<HourOfDay>()
        .map_err(|err| AppError::field(field, err.to_string()))
}

/// Parses the time slot, then checks every reference before anything is
/// written. All missing references are reported together.
async fn resolve_payload<P: EventPayload + Sync>(
    store: &dyn ScheduleStore,
    payload: &P,
) -> Result<(EventFields, Vec<GroupId>), AppError> {
    let start_hour = parse_hour("start_hour", payload.start_hour())?;
    let end_hour = parse_hour("end_hour", payload.end_hour())?;
    if start_hour.hours_until(end_hour).is_none() {
        return Err(AppError::field(
            "end_hour",
            "End hour must be after the start hour",
        ));
    }

    let fields = payload.fields(start_hour, end_hour);
    let group_ids = payload.group_ids();
    if group_ids.is_empty() {
        return Err(AppError::field("group_ids", "At least one group is required"));
    }

    let mut errors = ValidationErrors::new();
    let missing = |what: &str| {
        ValidationError::new("not_found").with_message(format!("{} not found", what).into())
    };

    if store.find_academic_year(fields.academic_year_id).await?.is_none() {
        errors.add("academic_year_id", missing("Academic year"));
    }
    if store.find_learning_type(fields.learning_type_id).await?.is_none() {
        errors.add("learning_type_id", missing("Learning type"));
    }
    if store.find_teacher(fields.teacher_id).await?.is_none() {
        errors.add("teacher_id", missing("Teacher"));
    }
    if store.find_discipline(fields.discipline_id).await?.is_none() {
        errors.add("discipline_id", missing("Discipline"));
    }
    if store.find_classroom(fields.classroom_id).await?.is_none() {
        errors.add("classroom_id", missing("Classroom"));
    }

    let found = store.find_groups(&group_ids).await?;
    let unknown: Vec<String> = group_ids
        .iter()
        .filter(|id| !found.iter().any(|g| g.id == **id))
        .map(ToString::to_string)
        .collect();
    if !unknown.is_empty() {
        errors.add(
            "group_ids",
            ValidationError::new("not_found")
                .with_message(format!("Unknown groups: {}", unknown.join(", ")).into()),
        );
    }

    if !errors.is_empty() {
        return Err(AppError::from_validation(&errors));
    }

    Ok((fields, group_ids))
}
