use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{list_notifications, mark_notification_read, stream_notifications};

/// Routes: GET /, GET /stream, POST /{id}/read
pub fn init_notifications_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/stream", get(stream_notifications))
        .route("/{id}/read", post(mark_notification_read))
}
