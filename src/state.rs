use std::sync::Arc;

use orar_config::cors::CorsConfig;
use orar_config::jwt::JwtConfig;

use crate::modules::notifications::hub::RealtimeHub;
use crate::modules::notifications::sink::{NotificationSink, StoreSink};
use crate::store::ScheduleStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ScheduleStore>,
    pub notifications: Arc<dyn NotificationSink>,
    pub hub: RealtimeHub,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    /// Wires the store into the services and a store-backed notification
    /// sink feeding a fresh realtime hub.
    pub fn build<S>(store: Arc<S>, jwt_config: JwtConfig, cors_config: CorsConfig) -> Self
    where
        S: ScheduleStore + 'static,
    {
        let hub = RealtimeHub::new();
        let sink = StoreSink::new(store.clone(), hub.clone());

        Self {
            store,
            notifications: Arc::new(sink),
            hub,
            jwt_config,
            cors_config,
        }
    }

    /// Replaces the notification sink, keeping everything else.
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notifications = sink;
        self
    }
}
