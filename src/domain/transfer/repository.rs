//! Transfer ledger read surface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entity::Transfer;
use crate::domain::player::PlayerId;
use crate::domain::team::TeamId;
use crate::domain::DomainError;

/// Read access to the ledger, oldest entry first
///
/// There is deliberately no update or delete; entries are appended through
/// [`RosterTransaction::append_transfer`](crate::domain::store::RosterTransaction::append_transfer).
#[async_trait]
pub trait TransferRepository: Send + Sync + std::fmt::Debug {
    async fn list_by_player(&self, player_id: &PlayerId) -> Result<Vec<Transfer>, DomainError>;

    async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<Transfer>, DomainError>;

    /// Entries for a team recorded within `[from, to]`
    async fn list_by_team_between(
        &self,
        team_id: &TeamId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transfer>, DomainError>;
}
