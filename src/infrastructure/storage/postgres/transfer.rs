use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::rows::{row_to_transfer, TRANSFER_COLUMNS};
use super::PostgresRosterStore;
use crate::domain::player::PlayerId;
use crate::domain::team::TeamId;
use crate::domain::transfer::{Transfer, TransferRepository};
use crate::domain::DomainError;

#[async_trait]
impl TransferRepository for PostgresRosterStore {
    async fn list_by_player(&self, player_id: &PlayerId) -> Result<Vec<Transfer>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transfers WHERE player_id = $1 ORDER BY recorded_at",
            TRANSFER_COLUMNS
        ))
        .bind(player_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list transfers: {}", e)))?;

        rows.iter().map(row_to_transfer).collect()
    }

    async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<Transfer>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transfers WHERE team_id = $1 ORDER BY recorded_at",
            TRANSFER_COLUMNS
        ))
        .bind(team_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list transfers: {}", e)))?;

        rows.iter().map(row_to_transfer).collect()
    }

    async fn list_by_team_between(
        &self,
        team_id: &TeamId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transfer>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM transfers
            WHERE team_id = $1 AND recorded_at BETWEEN $2 AND $3
            ORDER BY recorded_at
            "#,
            TRANSFER_COLUMNS
        ))
        .bind(team_id.as_uuid())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list transfers: {}", e)))?;

        rows.iter().map(row_to_transfer).collect()
    }
}
