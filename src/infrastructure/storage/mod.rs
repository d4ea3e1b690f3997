//! Storage infrastructure - Roster store implementations

mod factory;
mod in_memory;
pub mod migrations;
mod postgres;

pub use factory::{RosterBackend, StorageConfig, StorageFactory, StorageType};
pub use in_memory::InMemoryRosterStore;
pub use migrations::{run_roster_migrations, Migration, Migrator, PostgresMigrator};
pub use postgres::{PostgresConfig, PostgresRosterStore, PostgresTransaction};
