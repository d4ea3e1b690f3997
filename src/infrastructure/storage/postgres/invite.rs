use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::rows::{map_write_error, row_to_invite, INVITE_COLUMNS};
use super::PostgresRosterStore;
use crate::domain::invite::{Invite, InviteId, InviteRepository};
use crate::domain::player::PlayerId;
use crate::domain::team::TeamId;
use crate::domain::DomainError;

impl PostgresRosterStore {
    async fn fetch_invites(
        &self,
        filter: &str,
        team_id: Option<&TeamId>,
        invitee_id: Option<&PlayerId>,
    ) -> Result<Vec<Invite>, DomainError> {
        let sql = format!(
            "SELECT {} FROM invites WHERE active AND {} ORDER BY created_at",
            INVITE_COLUMNS, filter
        );
        let mut query = sqlx::query(&sql);

        // Placeholders are numbered team first, then invitee
        if let Some(team_id) = team_id {
            query = query.bind(team_id.as_uuid());
        }

        if let Some(invitee_id) = invitee_id {
            query = query.bind(invitee_id.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list invites: {}", e)))?;

        rows.iter().map(row_to_invite).collect()
    }
}

#[async_trait]
impl InviteRepository for PostgresRosterStore {
    async fn get(&self, id: &InviteId) -> Result<Option<Invite>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM invites WHERE id = $1", INVITE_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get invite: {}", e)))?;

        row.as_ref().map(row_to_invite).transpose()
    }

    async fn insert_exclusive(
        &self,
        invite: Invite,
        now: DateTime<Utc>,
    ) -> Result<Invite, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query(
            r#"
            UPDATE invites
            SET active = FALSE
            WHERE team_id = $1 AND invitee_id = $2 AND active AND expires_at <= $3
            "#,
        )
        .bind(invite.team_id.as_uuid())
        .bind(invite.invitee_id.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to retire expired invite: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO invites (id, inviter_id, invitee_id, team_id, approved, active,
                                 expires_at, approved_by, approved_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(invite.id.as_uuid())
        .bind(invite.inviter_id.as_str())
        .bind(invite.invitee_id.as_str())
        .bind(invite.team_id.as_uuid())
        .bind(invite.approved)
        .bind(invite.active)
        .bind(invite.expires_at)
        .bind(invite.approved_by.as_ref().map(PlayerId::as_str))
        .bind(invite.approved_at)
        .bind(invite.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to create invite"))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit invite: {}", e)))?;

        Ok(invite)
    }

    async fn save_decision(
        &self,
        invite: &Invite,
        expected: Option<bool>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE invites
            SET approved = $2, active = $3, expires_at = $4, approved_by = $5, approved_at = $6
            WHERE id = $1 AND active AND approved IS NOT DISTINCT FROM $7
            "#,
        )
        .bind(invite.id.as_uuid())
        .bind(invite.approved)
        .bind(invite.active)
        .bind(invite.expires_at)
        .bind(invite.approved_by.as_ref().map(PlayerId::as_str))
        .bind(invite.approved_at)
        .bind(expected)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to save invite decision: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_active(
        &self,
        team_id: &TeamId,
        invitee_id: &PlayerId,
    ) -> Result<Option<Invite>, DomainError> {
        let invites = self
            .fetch_invites("team_id = $1 AND invitee_id = $2", Some(team_id), Some(invitee_id))
            .await?;

        Ok(invites.into_iter().next())
    }

    async fn list_active_by_team(&self, team_id: &TeamId) -> Result<Vec<Invite>, DomainError> {
        self.fetch_invites("team_id = $1", Some(team_id), None).await
    }

    async fn list_active_by_invitee(
        &self,
        invitee_id: &PlayerId,
    ) -> Result<Vec<Invite>, DomainError> {
        self.fetch_invites("invitee_id = $1", None, Some(invitee_id))
            .await
    }

    async fn list_awaiting_approval(&self) -> Result<Vec<Invite>, DomainError> {
        self.fetch_invites("approved IS NULL", None, None).await
    }

    async fn close_all_for_team(&self, team_id: &TeamId) -> Result<u64, DomainError> {
        let result = sqlx::query("UPDATE invites SET active = FALSE WHERE team_id = $1 AND active")
            .bind(team_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to close team invites: {}", e)))?;

        Ok(result.rows_affected())
    }
}
