//! In-process pub/sub for live notification pushes.
//!
//! Each recipient has its own broadcast channel, created on first
//! subscription. Publishing to a recipient with no open stream is a no-op;
//! the persisted notification row stays the durable record.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use orar_models::ids::UserId;
use orar_models::notifications::NotificationPayload;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct RealtimeHub {
    channels: Arc<RwLock<HashMap<UserId, broadcast::Sender<NotificationPayload>>>>,
    capacity: usize,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Pushes to every open stream of the recipient. Returns whether anyone
    /// was listening.
    pub fn publish(&self, recipient: UserId, payload: NotificationPayload) -> bool {
        let channels = self.channels.read();
        match channels.get(&recipient) {
            Some(tx) => tx.send(payload).is_ok(),
            None => false,
        }
    }

    pub fn subscribe(&self, recipient: UserId) -> broadcast::Receiver<NotificationPayload> {
        let mut channels = self.channels.write();
        channels
            .entry(recipient)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Drops channels whose streams have all closed.
    pub fn cleanup(&self) {
        self.channels.write().retain(|_, tx| tx.receiver_count() > 0);
    }

    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}
