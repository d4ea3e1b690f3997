//! Migrate command - manages the PostgreSQL roster schema

use clap::{Args, ValueEnum};
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::storage::{
    Migrator, PostgresMigrator, PostgresRosterStore, StorageConfig,
};

#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[arg(value_enum, default_value_t = MigrateAction::Run)]
    pub action: MigrateAction,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrateAction {
    /// Apply every pending migration
    Run,
    /// Revert the most recent migration
    Revert,
    /// Print the applied schema version
    Status,
}

pub async fn run(config: &AppConfig, args: MigrateArgs) -> anyhow::Result<()> {
    let StorageConfig::Postgres(pg_config) = StorageConfig::from_settings(&config.storage)? else {
        anyhow::bail!("migrations need storage.backend = \"postgres\"");
    };

    let store = PostgresRosterStore::connect(&pg_config).await?;
    let migrator = PostgresMigrator::new(store.pool().clone());

    match args.action {
        MigrateAction::Run => {
            migrator.run().await?;
            info!("Migrations applied");
        }
        MigrateAction::Revert => {
            migrator.revert().await?;
            info!("Last migration reverted");
        }
        MigrateAction::Status => match migrator.version().await? {
            Some(version) => println!("Schema version: {}", version),
            None => println!("No migrations applied"),
        },
    }

    Ok(())
}
