use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use orar_core::AppError;
use orar_models::ids::EventId;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{RequireAdmin, RequireEventEditor, RequireProfesor};
use crate::modules::events::bulk_publish::BulkPublishService;
use crate::modules::events::model::{
    BulkPublishResult, CreateEventDto, Event, EventFilterParams, EventWithGroups, MoveEventDto,
    RejectEventDto, UpdateEventDto,
};
use crate::modules::events::service::EventService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a schedule event
#[utoipa::path(
    post,
    path = "/api/events",
    summary = "Create event",
    request_body = CreateEventDto,
    responses(
        (status = 201, description = "Event created", body = EventWithGroups),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_event(
    State(state): State<AppState>,
    RequireEventEditor(auth_user): RequireEventEditor,
    ValidatedJson(dto): ValidatedJson<CreateEventDto>,
) -> Result<(StatusCode, Json<EventWithGroups>), AppError> {
    let event = EventService::create_event(state.store.as_ref(), auth_user.principal(), dto).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// List schedule events
#[utoipa::path(
    get,
    path = "/api/events",
    summary = "List events",
    params(EventFilterParams),
    responses(
        (status = 200, description = "Events ordered by day and start hour; students only see published events", body = Vec<EventWithGroups>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<EventFilterParams>,
) -> Result<Json<Vec<EventWithGroups>>, AppError> {
    let events =
        EventService::list_events(state.store.as_ref(), auth_user.principal(), filters).await?;
    Ok(Json(events))
}

/// Get a schedule event with its groups
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    summary = "Get event",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event details", body = EventWithGroups),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EventWithGroups>, AppError> {
    let event = EventService::get_event(
        state.store.as_ref(),
        auth_user.principal(),
        EventId::from_uuid(id),
    )
    .await?;
    Ok(Json(event))
}

/// Replace an event's fields and groups
#[utoipa::path(
    put,
    path = "/api/events/{id}",
    summary = "Update event",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventDto,
    responses(
        (status = 200, description = "Event updated", body = EventWithGroups),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Published event is locked"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_event(
    State(state): State<AppState>,
    RequireEventEditor(auth_user): RequireEventEditor,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateEventDto>,
) -> Result<Json<EventWithGroups>, AppError> {
    let event = EventService::update_event(
        state.store.as_ref(),
        auth_user.principal(),
        EventId::from_uuid(id),
        dto,
    )
    .await?;
    Ok(Json(event))
}

/// Delete an event
#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    summary = "Delete event",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - administrators only"),
        (status = 404, description = "Event not found")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    RequireAdmin(_auth_user): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    EventService::delete_event(state.store.as_ref(), EventId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move an event to another slot, keeping its duration
#[utoipa::path(
    patch,
    path = "/api/events/{id}/move",
    summary = "Move event",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = MoveEventDto,
    responses(
        (status = 200, description = "Event moved", body = Event),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Event not found"),
        (status = 422, description = "Invalid start hour")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn move_event(
    State(state): State<AppState>,
    RequireEventEditor(auth_user): RequireEventEditor,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<MoveEventDto>,
) -> Result<Json<Event>, AppError> {
    let event = EventService::move_event(
        state.store.as_ref(),
        auth_user.principal(),
        EventId::from_uuid(id),
        dto,
    )
    .await?;
    Ok(Json(event))
}

/// Submit an event for approval
#[utoipa::path(
    post,
    path = "/api/events/{id}/submit",
    summary = "Submit event",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event is pending approval", body = Event),
        (status = 403, description = "Not the event's teacher"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Event is not a draft or rejected")
    ),
    tag = "Workflow",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn submit_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, AppError> {
    let event =
        EventService::submit_event(state.store.as_ref(), auth_user.principal(), EventId::from_uuid(id))
            .await?;
    Ok(Json(event))
}

/// Approve a pending event
#[utoipa::path(
    post,
    path = "/api/events/{id}/approve",
    summary = "Approve event",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event approved", body = Event),
        (status = 403, description = "Forbidden - secretaries and administrators only"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Event is not pending approval")
    ),
    tag = "Workflow",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn approve_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, AppError> {
    let event =
        EventService::approve_event(state.store.as_ref(), auth_user.principal(), EventId::from_uuid(id))
            .await?;
    Ok(Json(event))
}

/// Reject a pending or approved event
#[utoipa::path(
    post,
    path = "/api/events/{id}/reject",
    summary = "Reject event",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = RejectEventDto,
    responses(
        (status = 200, description = "Event rejected", body = Event),
        (status = 403, description = "Forbidden - secretaries and administrators only"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Event cannot be rejected in its current status"),
        (status = 422, description = "Missing or too long reason")
    ),
    tag = "Workflow",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn reject_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<RejectEventDto>,
) -> Result<Json<Event>, AppError> {
    let event = EventService::reject_event(
        state.store.as_ref(),
        auth_user.principal(),
        EventId::from_uuid(id),
        dto,
    )
    .await?;
    Ok(Json(event))
}

/// Publish an event
#[utoipa::path(
    post,
    path = "/api/events/{id}/publish",
    summary = "Publish event",
    description = "Secretaries publish pending or approved events; administrators publish from any status.",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event published", body = Event),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Event already published or not yet submitted")
    ),
    tag = "Workflow",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn publish_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, AppError> {
    let event =
        EventService::publish_event(state.store.as_ref(), auth_user.principal(), EventId::from_uuid(id))
            .await?;
    Ok(Json(event))
}

/// Submit all of the caller's draft events and notify the secretaries
#[utoipa::path(
    post,
    path = "/api/events/bulk-publish",
    summary = "Bulk submit own schedule",
    responses(
        (status = 200, description = "Drafts submitted", body = BulkPublishResult),
        (status = 403, description = "Caller is not a teacher or has no teacher profile"),
        (status = 404, description = "Nothing pending")
    ),
    tag = "Workflow",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn bulk_publish(
    State(state): State<AppState>,
    RequireProfesor(auth_user): RequireProfesor,
) -> Result<Json<BulkPublishResult>, AppError> {
    let result = BulkPublishService::publish_for_teacher(
        state.store.as_ref(),
        state.notifications.as_ref(),
        auth_user.user_id(),
    )
    .await?;
    Ok(Json(result))
}
