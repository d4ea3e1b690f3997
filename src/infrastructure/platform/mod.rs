//! Platform directory implementations

mod http;
mod in_memory;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{PlatformBackend, PlatformSettings};
use crate::domain::platform::PlatformDirectory;
use crate::domain::DomainError;

pub use http::{HttpDirectoryConfig, HttpPlatformDirectory};
pub use in_memory::{InMemoryPlatformDirectory, SentMessage};

/// Builds the directory selected in configuration
pub fn create_platform_directory(
    settings: &PlatformSettings,
) -> Result<Arc<dyn PlatformDirectory>, DomainError> {
    match settings.backend {
        PlatformBackend::Memory => {
            info!("Using in-memory platform directory");
            Ok(Arc::new(InMemoryPlatformDirectory::new()))
        }
        PlatformBackend::Http => {
            let token = settings.token.clone().ok_or_else(|| {
                DomainError::configuration("platform.token is required for the http backend")
            })?;
            let guild_id = settings.guild_id.clone().ok_or_else(|| {
                DomainError::configuration("platform.guild_id is required for the http backend")
            })?;

            info!(base_url = %settings.base_url, guild_id = %guild_id, "Using HTTP platform directory");

            let directory = HttpPlatformDirectory::new(HttpDirectoryConfig {
                base_url: settings.base_url.clone(),
                guild_id,
                token,
                request_timeout: Duration::from_secs(settings.request_timeout_secs),
            })?;

            Ok(Arc::new(directory))
        }
    }
}
