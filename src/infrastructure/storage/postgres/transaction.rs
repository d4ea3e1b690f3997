use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use super::rows::{map_write_error, row_to_player, row_to_team, PLAYER_COLUMNS, TEAM_COLUMNS};
use crate::domain::player::{Player, PlayerId};
use crate::domain::store::RosterTransaction;
use crate::domain::team::{Team, TeamId};
use crate::domain::transfer::Transfer;
use crate::domain::DomainError;

/// Database transaction; rolled back by sqlx when dropped uncommitted
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PostgresTransaction {
    pub(super) fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl RosterTransaction for PostgresTransaction {
    async fn insert_team(&mut self, team: &Team) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO teams (id, name, tag, captain_id, league, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(team.id().as_uuid())
        .bind(team.name())
        .bind(team.tag())
        .bind(team.captain_id().map(PlayerId::as_str))
        .bind(team.league().as_str())
        .bind(team.is_active())
        .bind(team.created_at())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to create team"))?;

        Ok(())
    }

    async fn lock_team(&mut self, id: &TeamId) -> Result<Option<Team>, DomainError> {
        // Conflicts with the FOR UPDATE taken by replace_captain
        let row = sqlx::query(&format!(
            "SELECT {} FROM teams WHERE id = $1 FOR SHARE",
            TEAM_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to lock team: {}", e)))?;

        row.as_ref().map(row_to_team).transpose()
    }

    async fn clear_captain(
        &mut self,
        id: &TeamId,
        captain_id: &PlayerId,
    ) -> Result<bool, DomainError> {
        let result =
            sqlx::query("UPDATE teams SET captain_id = NULL WHERE id = $1 AND captain_id = $2")
                .bind(id.as_uuid())
                .bind(captain_id.as_str())
                .execute(&mut *self.tx)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to clear captain: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn archive_team(&mut self, id: &TeamId) -> Result<bool, DomainError> {
        // Waits for joins holding FOR SHARE on the row, then fences later ones
        let result = sqlx::query(
            "UPDATE teams SET active = FALSE, captain_id = NULL WHERE id = $1 AND active",
        )
        .bind(id.as_uuid())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to archive team: {}", e)))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teams WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check team: {}", e)))?;

        if !exists {
            return Err(DomainError::not_found(format!("Team '{}' not found", id)));
        }

        Ok(false)
    }

    async fn list_members(&mut self, id: &TeamId) -> Result<Vec<Player>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM players WHERE team_id = $1 ORDER BY registered_at",
            PLAYER_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list members: {}", e)))?;

        rows.iter().map(row_to_player).collect()
    }

    async fn move_player(
        &mut self,
        player_id: &PlayerId,
        from: Option<&TeamId>,
        to: Option<&TeamId>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE players
            SET team_id = $3
            WHERE id = $1 AND team_id IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(player_id.as_str())
        .bind(from.map(TeamId::as_uuid))
        .bind(to.map(TeamId::as_uuid))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to move player: {}", e)))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM players WHERE id = $1)")
            .bind(player_id.as_str())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check player: {}", e)))?;

        if !exists {
            return Err(DomainError::not_found(format!(
                "Player '{}' not found",
                player_id
            )));
        }

        Ok(false)
    }

    async fn append_transfer(&mut self, transfer: &Transfer) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO transfers (id, player_id, team_id, kind, lane, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(transfer.id.as_uuid())
        .bind(transfer.player_id.as_str())
        .bind(transfer.team_id.as_uuid())
        .bind(transfer.kind.as_str())
        .bind(transfer.lane.as_str())
        .bind(transfer.recorded_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to append transfer: {}", e)))?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit transaction: {}", e)))
    }
}
