//! League roster
//!
//! Team and membership management for an esports league community:
//! - Teams with unique names and tags, captained by one member
//! - Invites with optional moderator approval and lazy expiry
//! - Atomic joins and leaves, recorded in a transfer ledger
//! - Chat-platform roles and nicknames reconciled after each commit

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use api::state::AppState;
use infrastructure::platform::create_platform_directory;
use infrastructure::storage::{StorageConfig, StorageFactory};
use tracing::{info, warn};

/// Create the application state with the default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate()?;
    let storage = StorageConfig::from_settings(&config.storage)?;
    let backend = StorageFactory::create(&storage).await?;
    let directory = create_platform_directory(&config.platform)?;

    info!(
        approval_required = config.roster.approval_required,
        invite_validity_days = config.roster.invite_validity_days,
        moderators = config.moderation.moderator_ids.len(),
        "Roster services initialized"
    );

    if config.roster.approval_required && config.channels.moderation.is_none() {
        warn!("Invites need approval but no moderation channel is configured");
    }

    Ok(AppState::new(backend, directory, config))
}
