use std::sync::Arc;

use crate::config::Config;
use crate::db::ClassroomStore;
use crate::live::{Broadcaster, ConnectionRegistry, StreamSettings, TextSync};
use crate::services::auth_service::IdentityCache;

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ClassroomStore>,
    pub registry: Arc<ConnectionRegistry>,
    pub broadcaster: Broadcaster,
    pub identities: IdentityCache,
    pub texts: Arc<TextSync>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ClassroomStore>) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        Self {
            config: Arc::new(config),
            store,
            broadcaster: Broadcaster::new(registry.clone()),
            registry,
            identities: IdentityCache::new(),
            texts: Arc::new(TextSync::new()),
        }
    }

    /// The sentinel session skips existence checks
    pub fn is_test_session(&self, session_id: &str) -> bool {
        session_id == self.config.test_session_id
    }

    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            heartbeat_interval: self.config.heartbeat_interval(),
            buffer: self.config.stream_buffer.max(1),
        }
    }
}
