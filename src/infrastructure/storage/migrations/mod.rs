//! Database migrations for the roster schema

use async_trait::async_trait;
use sqlx::Executor;
use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Trait for running database migrations
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Runs all pending migrations
    async fn run(&self) -> Result<(), DomainError>;

    /// Reverts the last applied migration
    async fn revert(&self) -> Result<(), DomainError>;

    /// Returns the current migration version
    async fn version(&self) -> Result<Option<i64>, DomainError>;
}

/// PostgreSQL migrator tracking applied versions in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
    migrations: Vec<Migration>,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            migrations: roster_migrations(),
        }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                success BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    async fn is_applied(&self, version: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
            .bind(version)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))
    }

    /// Applies a single migration and records it, in one transaction
    pub async fn run_migration(&self, migration: &Migration) -> Result<(), DomainError> {
        self.ensure_migrations_table().await?;

        if self.is_applied(migration.version).await? {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin migration: {}", e)))?;

        (&mut *tx)
            .execute(sqlx::raw_sql(&migration.up))
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit().await.map_err(|e| {
            DomainError::storage(format!(
                "Failed to commit migration {}: {}",
                migration.version, e
            ))
        })?;

        info!(version = migration.version, description = %migration.description, "Applied migration");
        Ok(())
    }

    /// Reverts a single migration and removes its record
    pub async fn revert_migration(&self, migration: &Migration) -> Result<(), DomainError> {
        self.ensure_migrations_table().await?;

        if !self.is_applied(migration.version).await? {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin revert: {}", e)))?;

        (&mut *tx)
            .execute(sqlx::raw_sql(&migration.down))
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to revert migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to remove migration record {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit().await.map_err(|e| {
            DomainError::storage(format!(
                "Failed to commit revert of {}: {}",
                migration.version, e
            ))
        })?;

        info!(version = migration.version, "Reverted migration");
        Ok(())
    }
}

#[async_trait]
impl Migrator for PostgresMigrator {
    async fn run(&self) -> Result<(), DomainError> {
        for migration in &self.migrations {
            self.run_migration(migration).await?;
        }

        Ok(())
    }

    async fn revert(&self) -> Result<(), DomainError> {
        let Some(current) = self.version().await? else {
            return Ok(());
        };

        match self.migrations.iter().find(|m| m.version == current) {
            Some(migration) => self.revert_migration(migration).await,
            None => Err(DomainError::storage(format!(
                "Applied migration {} is unknown to this build",
                current
            ))),
        }
    }

    async fn version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations WHERE success = TRUE")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }
}

/// Represents a database migration
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: String,
    /// SQL to run when applying the migration
    pub up: String,
    /// SQL to run when reverting the migration
    pub down: String,
}

impl Migration {
    pub fn new(
        version: i64,
        description: impl Into<String>,
        up: impl Into<String>,
        down: impl Into<String>,
    ) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
            down: down.into(),
        }
    }
}

/// Schema of the roster, oldest first
pub fn roster_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create players table",
            r#"
            CREATE TABLE IF NOT EXISTS players (
                id VARCHAR(64) PRIMARY KEY,
                team_id UUID NULL,
                lane VARCHAR(16) NOT NULL,
                nickname VARCHAR(32) NOT NULL,
                premium BOOLEAN NOT NULL DEFAULT FALSE,
                bio VARCHAR(100) NULL,
                registered_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_players_team_id ON players(team_id);
            "#,
            r#"
            DROP TABLE IF EXISTS players;
            "#,
        ),
        Migration::new(
            2,
            "Create teams table",
            r#"
            CREATE TABLE IF NOT EXISTS teams (
                id UUID PRIMARY KEY,
                name VARCHAR(64) NOT NULL,
                tag VARCHAR(16) NOT NULL,
                captain_id VARCHAR(64) NULL REFERENCES players(id),
                league VARCHAR(16) NOT NULL DEFAULT 'prime',
                active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_teams_name_lower ON teams (LOWER(name));
            CREATE UNIQUE INDEX IF NOT EXISTS idx_teams_tag ON teams (tag);
            ALTER TABLE players
                ADD CONSTRAINT fk_players_team FOREIGN KEY (team_id) REFERENCES teams(id);
            "#,
            r#"
            ALTER TABLE players DROP CONSTRAINT IF EXISTS fk_players_team;
            DROP TABLE IF EXISTS teams;
            "#,
        ),
        Migration::new(
            3,
            "Create invites table",
            r#"
            CREATE TABLE IF NOT EXISTS invites (
                id UUID PRIMARY KEY,
                inviter_id VARCHAR(64) NOT NULL REFERENCES players(id),
                invitee_id VARCHAR(64) NOT NULL REFERENCES players(id),
                team_id UUID NOT NULL REFERENCES teams(id),
                approved BOOLEAN NULL,
                active BOOLEAN NOT NULL DEFAULT TRUE,
                expires_at TIMESTAMPTZ NOT NULL,
                approved_by VARCHAR(64) NULL,
                approved_at TIMESTAMPTZ NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_invites_active_pair
                ON invites (team_id, invitee_id) WHERE active;
            CREATE INDEX IF NOT EXISTS idx_invites_invitee ON invites (invitee_id) WHERE active;
            "#,
            r#"
            DROP TABLE IF EXISTS invites;
            "#,
        ),
        Migration::new(
            4,
            "Create transfers table",
            r#"
            CREATE TABLE IF NOT EXISTS transfers (
                id UUID PRIMARY KEY,
                player_id VARCHAR(64) NOT NULL REFERENCES players(id),
                team_id UUID NOT NULL REFERENCES teams(id),
                kind VARCHAR(16) NOT NULL,
                lane VARCHAR(16) NOT NULL,
                recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_transfers_player ON transfers (player_id, recorded_at);
            CREATE INDEX IF NOT EXISTS idx_transfers_team ON transfers (team_id, recorded_at);
            "#,
            r#"
            DROP TABLE IF EXISTS transfers;
            "#,
        ),
    ]
}

/// Runs all pending roster migrations
pub async fn run_roster_migrations(pool: &PgPool) -> Result<(), DomainError> {
    PostgresMigrator::new(pool.clone()).run().await
}
