//! Team registry: creation, archival, captaincy and departures

use std::sync::Arc;

use futures::future::join_all;
use tracing::info;

use super::membership::MembershipSynchronizer;
use super::platform_sync::PlatformSync;
use crate::domain::invite::InviteRepository;
use crate::domain::platform::{SyncStep, SyncWarning};
use crate::domain::player::{Player, PlayerId, PlayerRepository};
use crate::domain::store::RosterStore;
use crate::domain::team::{League, Team, TeamId, TeamQuery, TeamRepository};
use crate::domain::transfer::TransferKind;
use crate::domain::DomainError;
use crate::infrastructure::storage::RosterBackend;

/// Team lifecycle service
#[derive(Debug, Clone)]
pub struct TeamRegistry {
    store: Arc<dyn RosterStore>,
    teams: Arc<dyn TeamRepository>,
    players: Arc<dyn PlayerRepository>,
    invites: Arc<dyn InviteRepository>,
    membership: MembershipSynchronizer,
    platform: PlatformSync,
    tag_max_length: usize,
}

impl TeamRegistry {
    pub fn new(
        backend: &RosterBackend,
        membership: MembershipSynchronizer,
        platform: PlatformSync,
        tag_max_length: usize,
    ) -> Self {
        Self {
            store: backend.store.clone(),
            teams: backend.teams.clone(),
            players: backend.players.clone(),
            invites: backend.invites.clone(),
            membership,
            platform,
            tag_max_length,
        }
    }

    /// Create a team captained by `captain_id`
    ///
    /// The team row, the captain's membership and the `team_create` ledger
    /// entry commit together; the platform space is provisioned afterwards.
    pub async fn create_team(
        &self,
        name: &str,
        tag: &str,
        captain_id: &PlayerId,
        league: League,
    ) -> Result<(Team, Vec<SyncWarning>), DomainError> {
        let team = Team::new(name, tag, captain_id.clone(), league, self.tag_max_length)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let captain = self.require_player(captain_id).await?;
        if captain.team_id().is_some() {
            return Err(DomainError::already_in_team(format!(
                "Player '{}' is already on a team",
                captain.id()
            )));
        }

        let mut tx = self.store.begin().await?;
        tx.insert_team(&team).await?;
        self.membership
            .join_in(tx.as_mut(), &captain, &team, TransferKind::TeamCreate)
            .await?;
        tx.commit().await?;

        info!(
            team_id = %team.id(),
            name = %team.name(),
            tag = %team.tag(),
            captain_id = %captain.id(),
            "Team created"
        );

        let directory = self.platform.directory();
        let mut warnings = Vec::new();

        // The role has to exist before it can be granted to the captain
        warnings.extend(
            self.platform
                .attempt(
                    SyncStep::ProvisionSpace,
                    directory.provision_team_space(team.role_name(), &team.channel_name()),
                )
                .await,
        );
        warnings.extend(self.membership.mirror_join(&captain, &team).await);
        warnings.extend(
            self.platform
                .announce(&format!(
                    "{} [{}] was founded by {}",
                    team.name(),
                    team.tag(),
                    captain.nickname()
                ))
                .await,
        );

        Ok((team, warnings))
    }

    /// Archive a team and release all of its members
    ///
    /// Archiving an archived team succeeds without side effects.
    pub async fn archive_team(
        &self,
        team_id: &TeamId,
    ) -> Result<(Team, Vec<SyncWarning>), DomainError> {
        let team = self.require(team_id).await?;
        if !team.is_active() {
            return Ok((team, Vec::new()));
        }

        let mut tx = self.store.begin().await?;
        if !tx.archive_team(team.id()).await? {
            // Lost a race with another archive
            drop(tx);
            return Ok((self.require(team_id).await?, Vec::new()));
        }

        let members = tx.list_members(team.id()).await?;
        for member in &members {
            self.membership
                .leave_in(tx.as_mut(), member, &team, TransferKind::TeamDisband)
                .await?;
        }
        tx.commit().await?;

        let closed = self.invites.close_all_for_team(team.id()).await?;

        info!(
            team_id = %team.id(),
            members = members.len(),
            invites_closed = closed,
            "Team archived"
        );

        let mirrors = members
            .iter()
            .map(|member| self.membership.mirror_leave(member, &team));
        let mut warnings: Vec<SyncWarning> = join_all(mirrors).await.into_iter().flatten().collect();

        let directory = self.platform.directory();
        warnings.extend(
            self.platform
                .attempt(
                    SyncStep::DeprovisionSpace,
                    directory.deprovision_team_space(team.role_name(), &team.channel_name()),
                )
                .await,
        );
        warnings.extend(
            self.platform
                .announce(&format!("{} has been disbanded", team.name()))
                .await,
        );

        Ok((self.require(team_id).await?, warnings))
    }

    /// Hand the captaincy of a team to another current member
    pub async fn transfer_captaincy(
        &self,
        team_id: &TeamId,
        current_captain: &PlayerId,
        new_captain: &PlayerId,
    ) -> Result<(Team, Vec<SyncWarning>), DomainError> {
        let team = self.require_active(team_id).await?;

        if !team.is_captain(current_captain) {
            return Err(DomainError::permission_denied(format!(
                "Only the captain of '{}' can transfer ownership",
                team.name()
            )));
        }

        if current_captain == new_captain {
            return Err(DomainError::validation(format!(
                "'{}' already captains '{}'",
                new_captain,
                team.name()
            )));
        }

        let successor = self.require_player(new_captain).await?;
        if !successor.is_member_of(team.id()) {
            return Err(DomainError::not_in_team(format!(
                "Player '{}' is not on team '{}'",
                new_captain,
                team.name()
            )));
        }

        if !self
            .teams
            .replace_captain(team.id(), current_captain, new_captain)
            .await?
        {
            // Someone else changed the team between the checks and the write
            let team = self.require_active(team_id).await?;
            return Err(if team.is_captain(current_captain) {
                DomainError::not_in_team(format!(
                    "Player '{}' is no longer on team '{}'",
                    new_captain,
                    team.name()
                ))
            } else {
                DomainError::permission_denied(format!(
                    "'{}' no longer captains '{}'",
                    current_captain,
                    team.name()
                ))
            });
        }

        info!(
            team_id = %team.id(),
            from = %current_captain,
            to = %new_captain,
            "Captaincy transferred"
        );

        let warnings = self
            .platform
            .notify_player(
                new_captain,
                &format!("You are now the captain of {}", team.name()),
            )
            .await
            .into_iter()
            .collect();

        Ok((self.require(team_id).await?, warnings))
    }

    /// A member leaves their team; captains must hand over first
    pub async fn leave_team(
        &self,
        player_id: &PlayerId,
    ) -> Result<(Team, Vec<SyncWarning>), DomainError> {
        let player = self.require_player(player_id).await?;
        let team_id = player
            .team_id()
            .ok_or_else(|| DomainError::not_in_team(format!("Player '{}' is not on a team", player_id)))?;
        let team = self.require(team_id).await?;

        let warnings = self
            .membership
            .leave(&player, &team, TransferKind::PlayerLeave)
            .await?;

        Ok((team, warnings))
    }

    /// The captain removes a member from their team
    pub async fn kick_member(
        &self,
        captain_id: &PlayerId,
        member_id: &PlayerId,
    ) -> Result<(Team, Vec<SyncWarning>), DomainError> {
        if captain_id == member_id {
            return Err(DomainError::validation("You cannot kick yourself"));
        }

        let team = self.captained_by(captain_id).await?;
        let member = self.require_player(member_id).await?;

        if !member.is_member_of(team.id()) {
            return Err(DomainError::not_in_team(format!(
                "Player '{}' is not on team '{}'",
                member_id,
                team.name()
            )));
        }

        let mut warnings = self
            .membership
            .leave(&member, &team, TransferKind::PlayerLeave)
            .await?;
        warnings.extend(
            self.platform
                .notify_player(
                    member.id(),
                    &format!("You have been removed from {}", team.name()),
                )
                .await,
        );

        info!(team_id = %team.id(), member_id = %member_id, "Member kicked");
        Ok((team, warnings))
    }

    /// A registered player left the community platform
    ///
    /// Returns `None` when they were a free agent, so a replayed event is a
    /// no-op. Moderators are told when a team is left without a captain.
    pub async fn member_departed(
        &self,
        player_id: &PlayerId,
    ) -> Result<Option<(Team, Vec<SyncWarning>)>, DomainError> {
        let player = self.require_player(player_id).await?;
        let Some(team_id) = player.team_id() else {
            return Ok(None);
        };
        let team = self.require(team_id).await?;

        let vacated = self.membership.depart(&player, &team).await?;

        let mut warnings = Vec::new();
        if vacated {
            warnings.extend(
                self.platform
                    .notify_moderators(&format!(
                        "{} [{}] has no captain: {} left the server",
                        team.name(),
                        team.tag(),
                        player.nickname()
                    ))
                    .await,
            );
        }
        warnings.extend(
            self.platform
                .announce(&format!("{} left {}", player.nickname(), team.name()))
                .await,
        );

        Ok(Some((self.require(team_id).await?, warnings)))
    }

    /// A registered player came back to the community platform
    ///
    /// Re-applies the team role and nickname of a current member; returns
    /// `None` for a free agent, who has nothing to restore.
    pub async fn member_rejoined(
        &self,
        player_id: &PlayerId,
    ) -> Result<Option<(Team, Vec<SyncWarning>)>, DomainError> {
        let player = self.require_player(player_id).await?;
        let Some(team_id) = player.team_id() else {
            return Ok(None);
        };
        let team = self.require_active(team_id).await?;

        let warnings = self.membership.mirror_join(&player, &team).await;
        info!(
            player_id = %player.id(),
            team_id = %team.id(),
            warnings = warnings.len(),
            "Rejoined member restored"
        );

        Ok(Some((team, warnings)))
    }

    // Queries

    pub async fn get(&self, id: &TeamId) -> Result<Option<Team>, DomainError> {
        self.teams.get(id).await
    }

    /// Get a team by ID, archived teams included
    pub async fn require(&self, id: &TeamId) -> Result<Team, DomainError> {
        self.teams
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", id)))
    }

    async fn require_active(&self, id: &TeamId) -> Result<Team, DomainError> {
        let team = self.require(id).await?;
        if !team.is_active() {
            return Err(DomainError::not_found(format!(
                "Team '{}' has been archived",
                team.name()
            )));
        }
        Ok(team)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Team>, DomainError> {
        self.teams.find_by_name(name).await
    }

    pub async fn find_by_tag(&self, tag: &str) -> Result<Option<Team>, DomainError> {
        self.teams.find_by_tag(tag).await
    }

    /// Resolve a team by exact name, falling back to its tag
    pub async fn search(&self, term: &str) -> Result<Team, DomainError> {
        if let Some(team) = self.teams.find_by_name(term).await? {
            return Ok(team);
        }

        self.teams
            .find_by_tag(term)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("No team named or tagged '{}'", term)))
    }

    /// Active teams sorted by name, optionally filtered by a name substring
    pub async fn list_active(&self, name_filter: Option<&str>) -> Result<Vec<Team>, DomainError> {
        let mut query = TeamQuery::new();
        if let Some(filter) = name_filter.map(str::trim).filter(|f| !f.is_empty()) {
            query = query.with_name_filter(filter);
        }

        self.teams.list(&query).await
    }

    pub async fn members(&self, id: &TeamId) -> Result<Vec<Player>, DomainError> {
        self.players.list_by_team(id).await
    }

    /// The active team captained by a player
    pub async fn captained_by(&self, captain_id: &PlayerId) -> Result<Team, DomainError> {
        self.teams
            .find_by_captain(captain_id)
            .await?
            .filter(Team::is_active)
            .ok_or_else(|| DomainError::permission_denied("Only a team captain can do that"))
    }

    async fn require_player(&self, id: &PlayerId) -> Result<Player, DomainError> {
        self.players
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Player '{}' is not registered", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;

    use crate::config::ChannelSettings;
    use crate::domain::invite::Invite;
    use crate::domain::platform::PlatformDirectory;
    use crate::domain::player::LaneRole;
    use crate::domain::{ConflictKind, Transfer};
    use crate::infrastructure::platform::InMemoryPlatformDirectory;
    use crate::infrastructure::services::TransferLedger;

    struct Harness {
        backend: RosterBackend,
        directory: Arc<InMemoryPlatformDirectory>,
        registry: TeamRegistry,
    }

    async fn harness(handles: &[&str]) -> Harness {
        let backend = RosterBackend::in_memory();
        let directory = Arc::new(InMemoryPlatformDirectory::new());
        let platform = PlatformSync::new(
            directory.clone(),
            Duration::from_secs(1),
            ChannelSettings::default(),
        );
        let membership = MembershipSynchronizer::new(
            backend.store.clone(),
            TransferLedger::new(backend.transfers.clone()),
            platform.clone(),
        );
        let registry = TeamRegistry::new(&backend, membership, platform, 5);

        for handle in handles {
            let player = Player::new(pid(handle), *handle, LaneRole::Mid).unwrap();
            backend.players.create(player).await.unwrap();
        }

        Harness {
            backend,
            directory,
            registry,
        }
    }

    fn pid(handle: &str) -> PlayerId {
        PlayerId::new(handle).unwrap()
    }

    async fn join(h: &Harness, team: &Team, handle: &str) {
        let mut tx = h.backend.store.begin().await.unwrap();
        tx.move_player(&pid(handle), None, Some(team.id())).await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_create_team_provisions_and_seats_captain() {
        let h = harness(&["cap"]).await;

        let (team, warnings) = h
            .registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();

        assert!(warnings.is_empty());
        assert_eq!(team.tag(), "OTR");
        assert!(h.directory.has_space("Blue Otters").await);
        assert!(h.directory.roles_of(&pid("cap")).await.contains("Blue Otters"));

        let cap = h.backend.players.get(&pid("cap")).await.unwrap().unwrap();
        assert!(cap.is_member_of(team.id()));

        let ledger = h.backend.transfers.list_by_team(team.id()).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].kind, TransferKind::TeamCreate);
    }

    #[tokio::test]
    async fn test_create_team_rejections() {
        let h = harness(&["cap", "other"]).await;
        h.registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();

        let err = h
            .registry
            .create_team("Red Foxes", "fox", &pid("cap"), League::Prime)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyInTeam { .. }));

        let err = h
            .registry
            .create_team("BLUE OTTERS", "bo", &pid("other"), League::Prime)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict {
                kind: ConflictKind::NameTaken,
                ..
            }
        ));

        let err = h
            .registry
            .create_team("Red Foxes", "TOOLONG", &pid("other"), League::Prime)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let err = h
            .registry
            .create_team("Red Foxes", "fox", &pid("ghost"), League::Prime)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        // Failed attempts leave no trace in the ledger
        let other = h.backend.transfers.list_by_player(&pid("other")).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_archive_releases_members_once() {
        let h = harness(&["cap", "m1", "m2", "rookie"]).await;
        let (team, _) = h
            .registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();
        join(&h, &team, "m1").await;
        join(&h, &team, "m2").await;

        let invite = Invite::new(
            team.id().clone(),
            pid("cap"),
            pid("rookie"),
            Utc::now(),
            chrono::Duration::days(7),
        );
        h.backend.invites.insert_exclusive(invite, Utc::now()).await.unwrap();

        let (archived, _) = h.registry.archive_team(team.id()).await.unwrap();
        assert!(!archived.is_active());
        assert!(archived.captain_id().is_none());
        assert!(h.registry.members(team.id()).await.unwrap().is_empty());
        assert!(h
            .backend
            .invites
            .list_active_by_team(team.id())
            .await
            .unwrap()
            .is_empty());
        assert!(!h.directory.has_space("Blue Otters").await);

        let disbands = |entries: Vec<Transfer>| {
            entries
                .into_iter()
                .filter(|t| t.kind == TransferKind::TeamDisband)
                .count()
        };
        let first = disbands(h.backend.transfers.list_by_team(team.id()).await.unwrap());
        assert_eq!(first, 3);

        let (again, warnings) = h.registry.archive_team(team.id()).await.unwrap();
        assert!(!again.is_active());
        assert!(warnings.is_empty());
        let second = disbands(h.backend.transfers.list_by_team(team.id()).await.unwrap());
        assert_eq!(second, 3);
    }

    #[tokio::test]
    async fn test_archived_name_stays_reserved() {
        let h = harness(&["cap", "other"]).await;
        let (team, _) = h
            .registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();
        h.registry.archive_team(team.id()).await.unwrap();

        let err = h
            .registry
            .create_team("Blue Otters", "new", &pid("other"), League::Prime)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict {
                kind: ConflictKind::NameTaken,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_transfer_captaincy_rules() {
        let h = harness(&["cap", "m1", "outsider"]).await;
        let (team, _) = h
            .registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();
        join(&h, &team, "m1").await;

        let err = h
            .registry
            .transfer_captaincy(team.id(), &pid("m1"), &pid("cap"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));

        let err = h
            .registry
            .transfer_captaincy(team.id(), &pid("cap"), &pid("outsider"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotInTeam { .. }));

        let (team, _) = h
            .registry
            .transfer_captaincy(team.id(), &pid("cap"), &pid("m1"))
            .await
            .unwrap();
        assert!(team.is_captain(&pid("m1")));

        // Captaincy changes are not ledger events
        let ledger = h.backend.transfers.list_by_team(team.id()).await.unwrap();
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_captain_cannot_leave() {
        let h = harness(&["cap", "m1"]).await;
        let (team, _) = h
            .registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();
        join(&h, &team, "m1").await;

        let err = h.registry.leave_team(&pid("cap")).await.unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));

        h.registry.leave_team(&pid("m1")).await.unwrap();
        let err = h.registry.leave_team(&pid("m1")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotInTeam { .. }));
    }

    #[tokio::test]
    async fn test_leave_rechecks_captaincy_in_transaction() {
        let h = harness(&["cap", "m1"]).await;
        let (stale, _) = h
            .registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();
        join(&h, &stale, "m1").await;
        let m1 = h.backend.players.get(&pid("m1")).await.unwrap().unwrap();

        h.registry
            .transfer_captaincy(stale.id(), &pid("cap"), &pid("m1"))
            .await
            .unwrap();

        // `stale` still names cap as captain
        let err = h
            .registry
            .membership
            .leave(&m1, &stale, TransferKind::PlayerLeave)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));

        let m1 = h.backend.players.get(&pid("m1")).await.unwrap().unwrap();
        assert!(m1.is_member_of(stale.id()));
        let team = h.registry.require(stale.id()).await.unwrap();
        assert!(team.is_captain(&pid("m1")));
    }

    #[tokio::test]
    async fn test_leave_racing_captaincy_transfer_keeps_captain_seated() {
        let h = harness(&["cap", "m1"]).await;
        let (team, _) = h
            .registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();
        join(&h, &team, "m1").await;

        let (m1, cap) = (pid("m1"), pid("cap"));
        let (left, transferred) = tokio::join!(
            h.registry.leave_team(&m1),
            h.registry.transfer_captaincy(team.id(), &cap, &m1)
        );
        assert_eq!(left.is_ok() as u8 + transferred.is_ok() as u8, 1);

        let team = h.registry.require(team.id()).await.unwrap();
        let captain = team.captain_id().unwrap();
        let members = h.registry.members(team.id()).await.unwrap();
        assert!(members.iter().any(|m| m.id() == captain));
    }

    #[tokio::test]
    async fn test_departed_captain_is_unseated_and_removed() {
        let h = harness(&["cap", "m1"]).await;
        let (team, _) = h
            .registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();
        join(&h, &team, "m1").await;

        let (updated, warnings) = h
            .registry
            .member_departed(&pid("cap"))
            .await
            .unwrap()
            .unwrap();
        // No moderation channel in this harness, so the alert cannot be posted
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].step, SyncStep::Notify);
        assert!(updated.is_active());
        assert!(updated.captain_id().is_none());

        let members = h.registry.members(team.id()).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id(), &pid("m1"));

        let leaves: Vec<TransferKind> = h
            .backend
            .transfers
            .list_by_player(&pid("cap"))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(leaves, vec![TransferKind::TeamCreate, TransferKind::PlayerLeave]);

        // Replayed event
        assert!(h.registry.member_departed(&pid("cap")).await.unwrap().is_none());

        let err = h.registry.member_departed(&pid("ghost")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_departed_member_keeps_captain() {
        let h = harness(&["cap", "m1"]).await;
        let (team, _) = h
            .registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();
        join(&h, &team, "m1").await;

        let (updated, _) = h
            .registry
            .member_departed(&pid("m1"))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.is_captain(&pid("cap")));

        let m1 = h.backend.players.get(&pid("m1")).await.unwrap().unwrap();
        assert!(m1.team_id().is_none());
    }

    #[tokio::test]
    async fn test_rejoined_member_gets_role_and_nickname_back() {
        let h = harness(&["cap", "free"]).await;
        let (team, _) = h
            .registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();

        h.directory.revoke_role(&pid("cap"), "Blue Otters").await.unwrap();
        h.directory.set_nickname(&pid("cap"), None).await.unwrap();

        let (restored, warnings) = h
            .registry
            .member_rejoined(&pid("cap"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(restored.id(), team.id());
        assert!(warnings.is_empty());
        assert!(h.directory.roles_of(&pid("cap")).await.contains("Blue Otters"));
        assert_eq!(
            h.directory.nickname_of(&pid("cap")).await.as_deref(),
            Some("[OTR] cap")
        );

        assert!(h.registry.member_rejoined(&pid("free")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_kick_rules() {
        let h = harness(&["cap", "m1", "outsider"]).await;
        let (team, _) = h
            .registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();
        join(&h, &team, "m1").await;

        let err = h.registry.kick_member(&pid("cap"), &pid("cap")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let err = h.registry.kick_member(&pid("m1"), &pid("cap")).await.unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));

        let err = h
            .registry
            .kick_member(&pid("cap"), &pid("outsider"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotInTeam { .. }));

        h.registry.kick_member(&pid("cap"), &pid("m1")).await.unwrap();
        let m1 = h.backend.players.get(&pid("m1")).await.unwrap().unwrap();
        assert!(m1.team_id().is_none());
        assert!(!h.directory.roles_of(&pid("m1")).await.contains("Blue Otters"));
    }

    #[tokio::test]
    async fn test_search_by_name_or_tag() {
        let h = harness(&["cap"]).await;
        let (team, _) = h
            .registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();

        assert_eq!(h.registry.search("blue otters").await.unwrap().id(), team.id());
        assert_eq!(h.registry.search("otr").await.unwrap().id(), team.id());
        assert!(h.registry.search("nope").await.is_err());

        assert_eq!(h.registry.list_active(Some("otter")).await.unwrap().len(), 1);
        assert!(h.registry.list_active(Some("fox")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provisioning_failure_is_a_warning() {
        let h = harness(&["cap"]).await;
        h.directory.mark_absent(&pid("cap")).await;

        let (team, warnings) = h
            .registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();

        assert!(team.is_active());
        assert!(warnings.iter().any(|w| w.step == SyncStep::GrantRole));
        assert!(h.directory.has_space("Blue Otters").await);
    }
}
