use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    approve_event, bulk_publish, create_event, delete_event, get_event, list_events, move_event,
    publish_event, reject_event, submit_event, update_event,
};

/// Routes: POST /, GET /, POST /bulk-publish, GET|PUT|DELETE /{id},
/// PATCH /{id}/move, POST /{id}/{submit,approve,reject,publish}
pub fn init_events_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_event).get(list_events))
        .route("/bulk-publish", post(bulk_publish))
        .route(
            "/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/{id}/move", patch(move_event))
        .route("/{id}/submit", post(submit_event))
        .route("/{id}/approve", post(approve_event))
        .route("/{id}/reject", post(reject_event))
        .route("/{id}/publish", post(publish_event))
}
