use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, instrument};
use uuid::Uuid;

use orar_core::AppError;
use orar_models::ids::NotificationId;

use crate::middleware::auth::{AuthUser, StreamUser};
use crate::modules::notifications::model::{Notification, NotificationFilterParams};
use crate::modules::notifications::service::NotificationService;
use crate::state::AppState;

/// List the caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    summary = "List notifications",
    params(NotificationFilterParams),
    responses(
        (status = 200, description = "Notifications", body = Vec<Notification>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Notifications",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_notifications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<NotificationFilterParams>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications =
        NotificationService::list_notifications(state.store.as_ref(), auth_user.user_id(), filters)
            .await?;
    Ok(Json(notifications))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    summary = "Mark notification read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Notification not found")
    ),
    tag = "Notifications",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let notification = NotificationService::mark_read(
        state.store.as_ref(),
        auth_user.user_id(),
        NotificationId::from_uuid(id),
    )
    .await?;
    Ok(Json(notification))
}

/// Live notification stream (server-sent events)
///
/// Sends `connected` once, then one `notification` event per push. Pushes
/// missed while the client was disconnected are only available through the
/// list endpoint.
#[utoipa::path(
    get,
    path = "/api/notifications/stream",
    summary = "Stream notifications",
    params(("token" = Option<String>, Query, description = "JWT, for clients that cannot send headers")),
    responses(
        (status = 200, description = "text/event-stream of notifications"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Notifications",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn stream_notifications(
    State(state): State<AppState>,
    StreamUser(auth_user): StreamUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    state.hub.cleanup();
    let rx = state.hub.subscribe(auth_user.user_id());
    debug!(user_id = %auth_user.user_id(), "Notification stream opened");

    let connected =
        tokio_stream::once(Ok::<_, Infallible>(Event::default().event("connected").data("ok")));

    let events = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(payload) => Event::default()
            .event("notification")
            .json_data(&payload)
            .ok()
            .map(Ok),
        Err(BroadcastStreamRecvError::Lagged(missed)) => Event::default()
            .event("lagged")
            .json_data(serde_json::json!({ "missed": missed }))
            .ok()
            .map(Ok),
    });

    Sse::new(connected.chain(events)).keep_alive(KeepAlive::default())
}
