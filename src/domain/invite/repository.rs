//! Invite repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entity::{Invite, InviteId};
use crate::domain::player::PlayerId;
use crate::domain::team::TeamId;
use crate::domain::DomainError;

/// Repository for invite persistence
#[async_trait]
pub trait InviteRepository: Send + Sync + std::fmt::Debug {
    /// Finds an invite by ID
    async fn get(&self, id: &InviteId) -> Result<Option<Invite>, DomainError>;

    /// Inserts an invite while keeping one active invite per (team, invitee)
    ///
    /// An active invite for the pair that expired before `now` is closed in
    /// the same step; an unexpired one makes this fail with
    /// `Conflict(DuplicateInvite)`.
    async fn insert_exclusive(
        &self,
        invite: Invite,
        now: DateTime<Utc>,
    ) -> Result<Invite, DomainError>;

    /// Persists a decision if the stored invite is still active and its
    /// `approved` flag still equals `expected`; returns `false` otherwise
    async fn save_decision(
        &self,
        invite: &Invite,
        expected: Option<bool>,
    ) -> Result<bool, DomainError>;

    /// Finds the active invite (expired or not) for a team and invitee
    async fn find_active(
        &self,
        team_id: &TeamId,
        invitee_id: &PlayerId,
    ) -> Result<Option<Invite>, DomainError>;

    /// Lists active invites sent on behalf of a team
    async fn list_active_by_team(&self, team_id: &TeamId) -> Result<Vec<Invite>, DomainError>;

    /// Lists active invites addressed to a player
    async fn list_active_by_invitee(
        &self,
        invitee_id: &PlayerId,
    ) -> Result<Vec<Invite>, DomainError>;

    /// Lists active invites still waiting for a moderator
    async fn list_awaiting_approval(&self) -> Result<Vec<Invite>, DomainError>;

    /// Closes every active invite of a team; returns how many were closed
    async fn close_all_for_team(&self, team_id: &TeamId) -> Result<u64, DomainError>;
}
