//! Player repository trait

use async_trait::async_trait;

use super::entity::{Player, PlayerId};
use crate::domain::team::TeamId;
use crate::domain::DomainError;

/// Repository for player records
///
/// Membership (`team_id`) is not written here; it only changes inside a
/// [`RosterTransaction`](crate::domain::store::RosterTransaction).
#[async_trait]
pub trait PlayerRepository: Send + Sync + std::fmt::Debug {
    /// Get a player by handle
    async fn get(&self, id: &PlayerId) -> Result<Option<Player>, DomainError>;

    /// Register a new player
    async fn create(&self, player: Player) -> Result<Player, DomainError>;

    /// Persist nickname, lane, premium flag and bio
    async fn update_profile(&self, player: &Player) -> Result<Player, DomainError>;

    /// Check if a player is registered
    async fn exists(&self, id: &PlayerId) -> Result<bool, DomainError>;

    /// List the current members of a team
    async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<Player>, DomainError>;

    /// List registered players without a team
    async fn list_free_agents(&self) -> Result<Vec<Player>, DomainError>;
}
