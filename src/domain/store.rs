//! Transactional write path of the roster store
//!
//! Membership changes and their ledger entries are written through a
//! [`RosterTransaction`] so the check-then-set on `Player.team_id` and the
//! ledger append commit or vanish together. Dropping a transaction without
//! calling [`RosterTransaction::commit`] rolls it back.

use async_trait::async_trait;

use crate::domain::player::{Player, PlayerId};
use crate::domain::team::{Team, TeamId};
use crate::domain::transfer::Transfer;
use crate::domain::DomainError;

/// An open unit of work against the roster store
#[async_trait]
pub trait RosterTransaction: Send {
    /// Inserts a new team
    ///
    /// Fails with `Conflict(NameTaken)` or `Conflict(TagTaken)` when any
    /// team, archived ones included, already uses the name or tag.
    async fn insert_team(&mut self, team: &Team) -> Result<(), DomainError>;

    /// Reads a team and holds it stable until commit
    ///
    /// Captaincy changes and archival wait for this lock, so checks made
    /// against the returned team still hold when the transaction commits.
    /// Returns `None` for an unknown team.
    async fn lock_team(&mut self, id: &TeamId) -> Result<Option<Team>, DomainError>;

    /// Deactivates a team and clears its captain
    ///
    /// Returns `false` when the team was already archived, `NotFound` when
    /// it does not exist. Concurrent joins are fenced off from this point.
    async fn archive_team(&mut self, id: &TeamId) -> Result<bool, DomainError>;

    /// Clears the captain of a team only if it is still `captain_id`;
    /// returns whether a row changed
    async fn clear_captain(
        &mut self,
        id: &TeamId,
        captain_id: &PlayerId,
    ) -> Result<bool, DomainError>;

    /// Current members of a team as seen by this transaction
    async fn list_members(&mut self, id: &TeamId) -> Result<Vec<Player>, DomainError>;

    /// Moves a player from `from` to `to` only if the stored `team_id`
    /// still equals `from`; returns whether a row changed
    async fn move_player(
        &mut self,
        player_id: &PlayerId,
        from: Option<&TeamId>,
        to: Option<&TeamId>,
    ) -> Result<bool, DomainError>;

    /// Appends a ledger entry
    async fn append_transfer(&mut self, transfer: &Transfer) -> Result<(), DomainError>;

    /// Makes every write of this transaction durable
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}

/// Entry point for transactional writes
#[async_trait]
pub trait RosterStore: Send + Sync + std::fmt::Debug {
    async fn begin(&self) -> Result<Box<dyn RosterTransaction>, DomainError>;
}
