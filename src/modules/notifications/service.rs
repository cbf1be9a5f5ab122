use anyhow::anyhow;
use tracing::{debug, instrument};

use orar_core::AppError;
use orar_models::ids::{NotificationId, UserId};
use orar_models::notifications::{Notification, NotificationFilterParams};

use crate::store::ScheduleStore;

pub struct NotificationService;

impl NotificationService {
    #[instrument(skip(store))]
    pub async fn list_notifications(
        store: &dyn ScheduleStore,
        user_id: UserId,
        filters: NotificationFilterParams,
    ) -> Result<Vec<Notification>, AppError> {
        store
            .list_notifications(user_id, filters.unread_only)
            .await
    }

    /// Marks one of the caller's notifications read. Someone else's
    /// notification is reported as missing.
    #[instrument(skip(store))]
    pub async fn mark_read(
        store: &dyn ScheduleStore,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<Notification, AppError> {
        let notification = store
            .mark_notification_read(id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Notification not found")))?;

        debug!(notification_id = %id, "Notification marked read");
        Ok(notification)
    }
}
