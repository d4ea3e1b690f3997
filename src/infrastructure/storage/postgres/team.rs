use async_trait::async_trait;

use super::rows::{row_to_team, TEAM_COLUMNS};
use super::PostgresRosterStore;
use crate::domain::player::PlayerId;
use crate::domain::team::{normalize_tag, Team, TeamId, TeamQuery, TeamRepository};
use crate::domain::DomainError;

impl PostgresRosterStore {
    async fn fetch_team(&self, filter: &str, value: &str) -> Result<Option<Team>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM teams WHERE {}", TEAM_COLUMNS, filter))
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get team: {}", e)))?;

        row.as_ref().map(row_to_team).transpose()
    }
}

#[async_trait]
impl TeamRepository for PostgresRosterStore {
    async fn get(&self, id: &TeamId) -> Result<Option<Team>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM teams WHERE id = $1", TEAM_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get team: {}", e)))?;

        row.as_ref().map(row_to_team).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, DomainError> {
        self.fetch_team("LOWER(name) = LOWER($1)", name.trim()).await
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Option<Team>, DomainError> {
        self.fetch_team("tag = $1", &normalize_tag(tag)).await
    }

    async fn find_by_captain(&self, captain_id: &PlayerId) -> Result<Option<Team>, DomainError> {
        self.fetch_team("captain_id = $1", captain_id.as_str()).await
    }

    async fn list(&self, query: &TeamQuery) -> Result<Vec<Team>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM teams
            WHERE ($1 OR active)
              AND ($2::TEXT IS NULL OR league = $2)
              AND ($3::TEXT IS NULL OR name ILIKE '%' || $3 || '%')
            ORDER BY name
            "#,
            TEAM_COLUMNS
        ))
        .bind(query.include_archived)
        .bind(query.league.map(|l| l.as_str()))
        .bind(query.name_contains.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list teams: {}", e)))?;

        rows.iter().map(row_to_team).collect()
    }

    async fn replace_captain(
        &self,
        id: &TeamId,
        from: &PlayerId,
        to: &PlayerId,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        // Waits out leaves holding FOR SHARE, so the membership check below
        // runs on a fresh snapshot
        sqlx::query("SELECT 1 FROM teams WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to lock team: {}", e)))?;

        let result = sqlx::query(
            r#"
            UPDATE teams
            SET captain_id = $3
            WHERE id = $1
              AND active
              AND captain_id = $2
              AND EXISTS (SELECT 1 FROM players WHERE id = $3 AND team_id = $1)
            "#,
        )
        .bind(id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to transfer captaincy: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit transaction: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
