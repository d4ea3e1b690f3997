//! Append-only audit of membership changes

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::player::{LaneRole, PlayerId};
use crate::domain::store::RosterTransaction;
use crate::domain::team::TeamId;
use crate::domain::transfer::{Transfer, TransferKind, TransferRepository};
use crate::domain::DomainError;

/// Records transfers inside the caller's transaction and answers history
/// queries. Membership is never derived from the ledger.
#[derive(Debug, Clone)]
pub struct TransferLedger {
    transfers: Arc<dyn TransferRepository>,
}

impl TransferLedger {
    pub fn new(transfers: Arc<dyn TransferRepository>) -> Self {
        Self { transfers }
    }

    pub async fn record(
        &self,
        tx: &mut dyn RosterTransaction,
        player_id: &PlayerId,
        team_id: &TeamId,
        kind: TransferKind,
        lane: LaneRole,
    ) -> Result<Transfer, DomainError> {
        let transfer = Transfer::new(player_id.clone(), team_id.clone(), kind, lane);
        tx.append_transfer(&transfer).await?;

        debug!(player_id = %player_id, team_id = %team_id, kind = %kind, "Transfer recorded");
        Ok(transfer)
    }

    pub async fn for_player(&self, player_id: &PlayerId) -> Result<Vec<Transfer>, DomainError> {
        self.transfers.list_by_player(player_id).await
    }

    pub async fn for_team(&self, team_id: &TeamId) -> Result<Vec<Transfer>, DomainError> {
        self.transfers.list_by_team(team_id).await
    }

    /// Entries for a team recorded within `[from, to]`
    pub async fn for_team_between(
        &self,
        team_id: &TeamId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transfer>, DomainError> {
        if from > to {
            return Err(DomainError::validation("History window starts after it ends"));
        }

        self.transfers.list_by_team_between(team_id, from, to).await
    }
}
