//! Storage factory for runtime backend selection

use std::sync::Arc;

use tracing::info;

use crate::config::{StorageBackend, StorageSettings};
use crate::domain::invite::InviteRepository;
use crate::domain::player::PlayerRepository;
use crate::domain::store::RosterStore;
use crate::domain::team::TeamRepository;
use crate::domain::transfer::TransferRepository;
use crate::domain::DomainError;

use super::in_memory::InMemoryRosterStore;
use super::migrations::run_roster_migrations;
use super::postgres::{PostgresConfig, PostgresRosterStore};

/// Supported storage types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Postgres(PostgresConfig),
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn postgres(config: PostgresConfig) -> Self {
        Self::Postgres(config)
    }

    /// Resolve the configured backend; PostgreSQL needs `database_url`
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, DomainError> {
        match settings.backend {
            StorageBackend::Memory => Ok(Self::InMemory),
            StorageBackend::Postgres => {
                let url = settings.database_url.as_deref().ok_or_else(|| {
                    DomainError::configuration(
                        "storage.database_url is required for the postgres backend",
                    )
                })?;

                Ok(Self::Postgres(
                    PostgresConfig::new(url).with_max_connections(settings.max_connections),
                ))
            }
        }
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// Every roster port, all served by the same backend
#[derive(Debug, Clone)]
pub struct RosterBackend {
    pub store: Arc<dyn RosterStore>,
    pub players: Arc<dyn PlayerRepository>,
    pub teams: Arc<dyn TeamRepository>,
    pub invites: Arc<dyn InviteRepository>,
    pub transfers: Arc<dyn TransferRepository>,
}

impl RosterBackend {
    fn from_store<S>(store: S) -> Self
    where
        S: RosterStore
            + PlayerRepository
            + TeamRepository
            + InviteRepository
            + TransferRepository
            + 'static,
    {
        let store = Arc::new(store);

        Self {
            store: store.clone(),
            players: store.clone(),
            teams: store.clone(),
            invites: store.clone(),
            transfers: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_store(InMemoryRosterStore::new())
    }
}

/// Factory for creating roster backends
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates a backend; PostgreSQL schemas are migrated before use
    pub async fn create(config: &StorageConfig) -> Result<RosterBackend, DomainError> {
        match config {
            StorageConfig::InMemory => {
                info!("Using in-memory roster storage");
                Ok(RosterBackend::in_memory())
            }
            StorageConfig::Postgres(pg_config) => {
                info!(
                    storage = ?config.storage_type(),
                    max_connections = pg_config.max_connections,
                    "Connecting to PostgreSQL"
                );
                let store = PostgresRosterStore::connect(pg_config).await?;
                run_roster_migrations(store.pool()).await?;
                Ok(RosterBackend::from_store(store))
            }
        }
    }
}
