use async_trait::async_trait;

use super::rows::{map_write_error, row_to_player, PLAYER_COLUMNS};
use super::PostgresRosterStore;
use crate::domain::player::{Player, PlayerId, PlayerRepository};
use crate::domain::team::TeamId;
use crate::domain::DomainError;

#[async_trait]
impl PlayerRepository for PostgresRosterStore {
    async fn get(&self, id: &PlayerId) -> Result<Option<Player>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM players WHERE id = $1", PLAYER_COLUMNS))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get player: {}", e)))?;

        row.as_ref().map(row_to_player).transpose()
    }

    async fn create(&self, player: Player) -> Result<Player, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO players (id, team_id, lane, nickname, premium, bio, registered_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(player.id().as_str())
        .bind(player.team_id().map(TeamId::as_uuid))
        .bind(player.lane().as_str())
        .bind(player.nickname())
        .bind(player.is_premium())
        .bind(player.bio())
        .bind(player.registered_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to create player"))?;

        Ok(player)
    }

    async fn update_profile(&self, player: &Player) -> Result<Player, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE players
            SET nickname = $2, lane = $3, bio = $4, premium = $5
            WHERE id = $1
            RETURNING {}
            "#,
            PLAYER_COLUMNS
        ))
        .bind(player.id().as_str())
        .bind(player.nickname())
        .bind(player.lane().as_str())
        .bind(player.bio())
        .bind(player.is_premium())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update player: {}", e)))?;

        match row {
            Some(row) => row_to_player(&row),
            None => Err(DomainError::not_found(format!(
                "Player '{}' not found",
                player.id()
            ))),
        }
    }

    async fn exists(&self, id: &PlayerId) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM players WHERE id = $1)")
            .bind(id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check player: {}", e)))
    }

    async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<Player>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM players WHERE team_id = $1 ORDER BY registered_at",
            PLAYER_COLUMNS
        ))
        .bind(team_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list team members: {}", e)))?;

        rows.iter().map(row_to_player).collect()
    }

    async fn list_free_agents(&self) -> Result<Vec<Player>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM players WHERE team_id IS NULL ORDER BY registered_at",
            PLAYER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list free agents: {}", e)))?;

        rows.iter().map(row_to_player).collect()
    }
}
