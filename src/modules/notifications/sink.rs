//! Notification dispatch capability handed to the workflow.
//!
//! The workflow asks the sink to notify a set of recipients without knowing
//! whether a realtime transport is attached. [`StoreSink`] persists one row
//! per recipient and then attempts a best-effort live push.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use orar_models::ids::UserId;
use orar_models::notifications::{NewNotification, NotificationPayload};

use crate::metrics::track_notification;
use crate::modules::notifications::hub::RealtimeHub;
use crate::store::NotificationRepository;

/// Per-call delivery outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Recipients whose notification row was written
    pub persisted: u64,
    pub failed: u64,
    /// Recipients that also had an open stream
    pub pushed: u64,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, recipients: &[UserId], title: &str, message: &str) -> DeliveryReport;
}

pub struct StoreSink {
    repository: Arc<dyn NotificationRepository>,
    hub: RealtimeHub,
}

impl StoreSink {
    pub fn new(repository: Arc<dyn NotificationRepository>, hub: RealtimeHub) -> Self {
        Self { repository, hub }
    }
}

#[async_trait]
impl NotificationSink for StoreSink {
    async fn notify(&self, recipients: &[UserId], title: &str, message: &str) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for &user_id in recipients {
            let new = NewNotification {
                user_id,
                title: title.to_string(),
                message: message.to_string(),
            };

            match self.repository.insert_notification(&new).await {
                Ok(notification) => {
                    report.persisted += 1;
                    track_notification("persisted");
                    if self
                        .hub
                        .publish(user_id, NotificationPayload::from(&notification))
                    {
                        report.pushed += 1;
                        track_notification("pushed");
                    } else {
                        debug!(recipient = %user_id, "No open stream, live push skipped");
                    }
                }
                Err(err) => {
                    report.failed += 1;
                    track_notification("failed");
                    warn!(recipient = %user_id, error = %err, "Failed to persist notification");
                }
            }
        }

        report
    }
}
