//! Join/leave protocol across the roster store and the platform
//!
//! The store transaction is the durability boundary: once it commits the
//! membership change stands, and platform reconciliation only ever adds
//! warnings to the result.

use std::sync::Arc;

use tracing::info;

use super::platform_sync::PlatformSync;
use super::transfer_ledger::TransferLedger;
use crate::domain::platform::{SyncStep, SyncWarning};
use crate::domain::player::Player;
use crate::domain::store::{RosterStore, RosterTransaction};
use crate::domain::team::Team;
use crate::domain::transfer::TransferKind;
use crate::domain::DomainError;

/// Moves players in and out of teams
#[derive(Debug, Clone)]
pub struct MembershipSynchronizer {
    store: Arc<dyn RosterStore>,
    ledger: TransferLedger,
    platform: PlatformSync,
}

impl MembershipSynchronizer {
    pub fn new(store: Arc<dyn RosterStore>, ledger: TransferLedger, platform: PlatformSync) -> Self {
        Self {
            store,
            ledger,
            platform,
        }
    }

    /// Adds `player` to `team`, commits, then mirrors the change
    pub async fn join(
        &self,
        player: &Player,
        team: &Team,
        kind: TransferKind,
    ) -> Result<Vec<SyncWarning>, DomainError> {
        let mut tx = self.store.begin().await?;
        self.join_in(tx.as_mut(), player, team, kind).await?;
        tx.commit().await?;

        info!(player_id = %player.id(), team_id = %team.id(), kind = %kind, "Player joined team");

        let mut warnings = self.mirror_join(player, team).await;
        warnings.extend(
            self.platform
                .announce(&format!("{} joined {}", player.nickname(), team.name()))
                .await,
        );
        Ok(warnings)
    }

    /// Store half of a join, inside a caller-owned transaction
    ///
    /// Fails with `NotFound` for a missing or archived team and with
    /// `AlreadyInTeam` when the player's `team_id` is no longer null.
    pub async fn join_in(
        &self,
        tx: &mut dyn RosterTransaction,
        player: &Player,
        team: &Team,
        kind: TransferKind,
    ) -> Result<(), DomainError> {
        debug_assert!(kind.is_join());

        match tx.lock_team(team.id()).await? {
            Some(locked) if locked.is_active() => {}
            Some(_) => {
                return Err(DomainError::not_found(format!(
                    "Team '{}' has been archived",
                    team.name()
                )));
            }
            None => {
                return Err(DomainError::not_found(format!(
                    "Team '{}' not found",
                    team.id()
                )));
            }
        }

        if !tx.move_player(player.id(), None, Some(team.id())).await? {
            return Err(DomainError::already_in_team(format!(
                "Player '{}' is already on a team",
                player.id()
            )));
        }

        self.ledger
            .record(tx, player.id(), team.id(), kind, player.lane())
            .await?;

        Ok(())
    }

    /// Platform half of a join: team role and `[TAG] nickname`
    pub async fn mirror_join(&self, player: &Player, team: &Team) -> Vec<SyncWarning> {
        let directory = self.platform.directory();
        let mut warnings = Vec::new();

        warnings.extend(
            self.platform
                .attempt(
                    SyncStep::GrantRole,
                    directory.grant_role(player.id(), team.role_name()),
                )
                .await,
        );

        warnings.extend(
            self.platform
                .attempt(
                    SyncStep::SetNickname,
                    directory.set_nickname(
                        player.id(),
                        Some(team.member_nickname(player.nickname())),
                    ),
                )
                .await,
        );

        warnings
    }

    /// Removes `player` from `team`, commits, then mirrors the change
    ///
    /// Fails with `NotInTeam` unless the player is currently on `team`.
    pub async fn leave(
        &self,
        player: &Player,
        team: &Team,
        kind: TransferKind,
    ) -> Result<Vec<SyncWarning>, DomainError> {
        debug_assert!(!kind.is_join());

        let mut tx = self.store.begin().await?;
        self.leave_in(tx.as_mut(), player, team, kind).await?;
        tx.commit().await?;

        info!(player_id = %player.id(), team_id = %team.id(), kind = %kind, "Player left team");

        let mut warnings = self.mirror_leave(player, team).await;
        warnings.extend(
            self.platform
                .announce(&format!("{} left {}", player.nickname(), team.name()))
                .await,
        );
        Ok(warnings)
    }

    /// Store half of a leave, inside a caller-owned transaction
    ///
    /// The team's current captain is refused with `PermissionDenied`; the
    /// check runs against the locked row, not the caller's copy of `team`.
    pub async fn leave_in(
        &self,
        tx: &mut dyn RosterTransaction,
        player: &Player,
        team: &Team,
        kind: TransferKind,
    ) -> Result<(), DomainError> {
        if let Some(locked) = tx.lock_team(team.id()).await? {
            if locked.is_captain(player.id()) {
                return Err(DomainError::permission_denied(format!(
                    "'{}' captains '{}'; transfer ownership before leaving",
                    player.id(),
                    team.name()
                )));
            }
        }

        if !tx.move_player(player.id(), Some(team.id()), None).await? {
            return Err(DomainError::not_in_team(format!(
                "Player '{}' is not on team '{}'",
                player.id(),
                team.name()
            )));
        }

        self.ledger
            .record(tx, player.id(), team.id(), kind, player.lane())
            .await?;

        Ok(())
    }

    /// Removes a player who left the platform from `team`
    ///
    /// Vacating their captaincy and the `player-leave` move commit together.
    /// Nothing is mirrored, since the member is gone from the platform.
    /// Returns whether a captaincy was vacated.
    pub async fn depart(&self, player: &Player, team: &Team) -> Result<bool, DomainError> {
        let mut tx = self.store.begin().await?;
        let vacated = tx.clear_captain(team.id(), player.id()).await?;
        self.leave_in(tx.as_mut(), player, team, TransferKind::PlayerLeave)
            .await?;
        tx.commit().await?;

        info!(
            player_id = %player.id(),
            team_id = %team.id(),
            captain_vacated = vacated,
            "Departed player removed from team"
        );
        Ok(vacated)
    }

    /// Platform half of a leave: drop the role and restore the nickname
    pub async fn mirror_leave(&self, player: &Player, team: &Team) -> Vec<SyncWarning> {
        let directory = self.platform.directory();
        let mut warnings = Vec::new();

        warnings.extend(
            self.platform
                .attempt(
                    SyncStep::RevokeRole,
                    directory.revoke_role(player.id(), team.role_name()),
                )
                .await,
        );

        warnings.extend(
            self.platform
                .attempt(
                    SyncStep::ClearNickname,
                    directory.set_nickname(player.id(), None),
                )
                .await,
        );

        warnings
    }
}
