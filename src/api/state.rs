//! Application state shared by every handler

use std::sync::Arc;

use crate::config::{AppConfig, ModerationSettings};
use crate::domain::platform::PlatformDirectory;
use crate::infrastructure::services::CommandDispatcher;
use crate::infrastructure::storage::RosterBackend;

#[derive(Debug, Clone)]
pub struct AppState {
    pub dispatcher: Arc<CommandDispatcher>,
    pub backend: RosterBackend,
    pub moderation: Arc<ModerationSettings>,
}

impl AppState {
    pub fn new(
        backend: RosterBackend,
        directory: Arc<dyn PlatformDirectory>,
        config: &AppConfig,
    ) -> Self {
        let dispatcher = CommandDispatcher::new(&backend, directory, config);

        Self {
            dispatcher: Arc::new(dispatcher),
            backend,
            moderation: Arc::new(config.moderation.clone()),
        }
    }
}
