//! Invite workflow: creation, moderation and the invitee's answer

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use super::membership::MembershipSynchronizer;
use super::platform_sync::PlatformSync;
use crate::domain::approval::ApprovalGate;
use crate::domain::invite::{Invite, InviteId, InviteRepository};
use crate::domain::platform::SyncWarning;
use crate::domain::player::{Player, PlayerId, PlayerRepository};
use crate::domain::team::{Team, TeamId, TeamRepository};
use crate::domain::transfer::TransferKind;
use crate::domain::DomainError;
use crate::infrastructure::storage::RosterBackend;

/// Who is answering an invite
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decider {
    /// The invited player
    Invitee(PlayerId),
    /// A moderator acting on the approval queue
    Moderator(PlayerId),
}

/// Drives invites through their lifecycle
///
/// Expiry is never swept: every check compares `expires_at` with the
/// request time, so an expired invite behaves as if it did not exist.
#[derive(Debug, Clone)]
pub struct InviteWorkflow {
    invites: Arc<dyn InviteRepository>,
    teams: Arc<dyn TeamRepository>,
    players: Arc<dyn PlayerRepository>,
    membership: MembershipSynchronizer,
    platform: PlatformSync,
    gate: ApprovalGate,
    validity: Duration,
}

impl InviteWorkflow {
    pub fn new(
        backend: &RosterBackend,
        membership: MembershipSynchronizer,
        platform: PlatformSync,
        gate: ApprovalGate,
        validity: Duration,
    ) -> Self {
        Self {
            invites: backend.invites.clone(),
            teams: backend.teams.clone(),
            players: backend.players.clone(),
            membership,
            platform,
            gate,
            validity,
        }
    }

    /// Invite `invitee_id` to `team_id` on behalf of its captain
    pub async fn create_invite(
        &self,
        team_id: &TeamId,
        inviter_id: &PlayerId,
        invitee_id: &PlayerId,
        now: DateTime<Utc>,
    ) -> Result<(Invite, Vec<SyncWarning>), DomainError> {
        let team = self.require_active_team(team_id).await?;

        if !team.is_captain(inviter_id) {
            return Err(DomainError::permission_denied(format!(
                "Only the captain of '{}' can send invites",
                team.name()
            )));
        }

        let invitee = self.require_player(invitee_id).await?;
        if invitee.team_id().is_some() {
            return Err(DomainError::already_in_team(format!(
                "Player '{}' is already on a team",
                invitee_id
            )));
        }

        let mut invite = Invite::new(
            team.id().clone(),
            inviter_id.clone(),
            invitee_id.clone(),
            now,
            self.validity,
        );

        let needs_sign_off = self.gate.requires_sign_off(&invite);
        if !needs_sign_off {
            invite.approve(inviter_id.clone(), now, self.validity);
        }

        let invite = self.invites.insert_exclusive(invite, now).await?;

        info!(
            invite_id = %invite.id,
            team_id = %team.id(),
            invitee_id = %invitee_id,
            awaiting_approval = needs_sign_off,
            "Invite created"
        );

        let warnings = if needs_sign_off {
            self.platform
                .notify_moderators(&format!(
                    "Invite {} to {} for {} is waiting for approval",
                    invite.id,
                    team.name(),
                    invitee.nickname()
                ))
                .await
        } else {
            self.platform
                .notify_player(invitee_id, &invited_message(&team))
                .await
        };

        Ok((invite, warnings.into_iter().collect()))
    }

    /// Apply an approve/decline decision to an open invite
    pub async fn decide(
        &self,
        invite_id: &InviteId,
        approve: bool,
        decider: Decider,
        now: DateTime<Utc>,
    ) -> Result<(Invite, Vec<SyncWarning>), DomainError> {
        let invite = self
            .invites
            .get(invite_id)
            .await?
            .filter(|invite| invite.is_usable(now))
            .ok_or_else(|| DomainError::not_found(format!("Invite '{}' is not open", invite_id)))?;

        match decider {
            Decider::Moderator(moderator) => self.moderate(invite, approve, moderator, now).await,
            Decider::Invitee(invitee) => {
                if invite.invitee_id != invitee {
                    return Err(DomainError::permission_denied(
                        "This invite is addressed to someone else",
                    ));
                }

                if approve {
                    self.accept(invite, now).await
                } else {
                    self.decline(invite).await
                }
            }
        }
    }

    /// Accept the invitee's open invite from the team tagged `tag`
    pub async fn accept_by_tag(
        &self,
        invitee_id: &PlayerId,
        tag: &str,
        now: DateTime<Utc>,
    ) -> Result<(Invite, Vec<SyncWarning>), DomainError> {
        let invite = self.find_open_by_tag(invitee_id, tag, now).await?;
        self.decide(&invite.id, true, Decider::Invitee(invitee_id.clone()), now)
            .await
    }

    /// Decline the invitee's open invite from the team tagged `tag`
    pub async fn decline_by_tag(
        &self,
        invitee_id: &PlayerId,
        tag: &str,
        now: DateTime<Utc>,
    ) -> Result<(Invite, Vec<SyncWarning>), DomainError> {
        let invite = self.find_open_by_tag(invitee_id, tag, now).await?;
        self.decide(&invite.id, false, Decider::Invitee(invitee_id.clone()), now)
            .await
    }

    /// Open invites sent by the team the player captains
    pub async fn list_pending(
        &self,
        captain_id: &PlayerId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invite>, DomainError> {
        let team = self
            .teams
            .find_by_captain(captain_id)
            .await?
            .filter(Team::is_active)
            .ok_or_else(|| DomainError::permission_denied("Only a team captain can do that"))?;

        let invites = self.invites.list_active_by_team(team.id()).await?;
        Ok(usable(invites, now))
    }

    /// Open invites addressed to the player
    pub async fn list_received(
        &self,
        invitee_id: &PlayerId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invite>, DomainError> {
        let invites = self.invites.list_active_by_invitee(invitee_id).await?;
        Ok(usable(invites, now))
    }

    /// Moderator queue
    pub async fn list_awaiting_approval(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invite>, DomainError> {
        let invites = self.invites.list_awaiting_approval().await?;
        Ok(usable(invites, now))
    }

    async fn moderate(
        &self,
        mut invite: Invite,
        approve: bool,
        moderator: PlayerId,
        now: DateTime<Utc>,
    ) -> Result<(Invite, Vec<SyncWarning>), DomainError> {
        if !invite.is_pending() {
            return Err(already_decided(&invite.id));
        }

        if approve {
            invite.approve(moderator.clone(), now, self.validity);
        } else {
            invite.decline();
        }

        if !self.invites.save_decision(&invite, None).await? {
            return Err(already_decided(&invite.id));
        }

        info!(invite_id = %invite.id, moderator = %moderator, approve, "Invite moderated");

        let team = self.require_team(&invite.team_id).await?;
        let mut warnings = Vec::new();

        if approve {
            warnings.extend(
                self.platform
                    .notify_player(&invite.invitee_id, &invited_message(&team))
                    .await,
            );
        }

        let verdict = if approve { "approved" } else { "rejected" };
        warnings.extend(
            self.platform
                .notify_player(
                    &invite.inviter_id,
                    &format!(
                        "A moderator {} your invite of {} to {}",
                        verdict,
                        invite.invitee_id,
                        team.name()
                    ),
                )
                .await,
        );

        Ok((invite, warnings))
    }

    async fn accept(
        &self,
        mut invite: Invite,
        now: DateTime<Utc>,
    ) -> Result<(Invite, Vec<SyncWarning>), DomainError> {
        if invite.is_pending() {
            return Err(DomainError::permission_denied(
                "This invite is awaiting moderator approval",
            ));
        }

        invite.approved_at = Some(now);
        invite.expires_at = now + self.validity;

        let player = self.require_player(&invite.invitee_id).await?;
        let team = self.require_team(&invite.team_id).await?;

        let mut warnings = self
            .membership
            .join(&player, &team, TransferKind::PlayerJoin)
            .await?;

        invite.close();
        if !self.invites.save_decision(&invite, Some(true)).await? {
            // Membership already committed; only the invite row is stale
            warn!(invite_id = %invite.id, "Invite changed while it was being accepted");
        }

        info!(invite_id = %invite.id, player_id = %player.id(), team_id = %team.id(), "Invite accepted");

        warnings.extend(
            self.platform
                .notify_player(
                    &invite.inviter_id,
                    &format!("{} accepted your invite to {}", player.nickname(), team.name()),
                )
                .await,
        );

        Ok((invite, warnings))
    }

    async fn decline(&self, mut invite: Invite) -> Result<(Invite, Vec<SyncWarning>), DomainError> {
        let expected = invite.approved;
        invite.decline();

        if !self.invites.save_decision(&invite, expected).await? {
            return Err(already_decided(&invite.id));
        }

        info!(invite_id = %invite.id, invitee_id = %invite.invitee_id, "Invite declined");

        let team = self.require_team(&invite.team_id).await?;
        let warnings = self
            .platform
            .notify_player(
                &invite.inviter_id,
                &format!("{} declined the invite to {}", invite.invitee_id, team.name()),
            )
            .await;

        Ok((invite, warnings.into_iter().collect()))
    }

    async fn find_open_by_tag(
        &self,
        invitee_id: &PlayerId,
        tag: &str,
        now: DateTime<Utc>,
    ) -> Result<Invite, DomainError> {
        let team = self
            .teams
            .find_by_tag(tag)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("No team tagged '{}'", tag.trim())))?;

        self.invites
            .find_active(team.id(), invitee_id)
            .await?
            .filter(|invite| invite.is_usable(now))
            .ok_or_else(|| {
                DomainError::not_found(format!("You have no open invite from '{}'", team.name()))
            })
    }

    async fn require_team(&self, id: &TeamId) -> Result<Team, DomainError> {
        self.teams
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", id)))
    }

    async fn require_active_team(&self, id: &TeamId) -> Result<Team, DomainError> {
        let team = self.require_team(id).await?;
        if !team.is_active() {
            return Err(DomainError::not_found(format!(
                "Team '{}' has been archived",
                team.name()
            )));
        }
        Ok(team)
    }

    async fn require_player(&self, id: &PlayerId) -> Result<Player, DomainError> {
        self.players
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Player '{}' is not registered", id)))
    }
}

fn usable(invites: Vec<Invite>, now: DateTime<Utc>) -> Vec<Invite> {
    invites.into_iter().filter(|i| i.is_usable(now)).collect()
}

fn already_decided(id: &InviteId) -> DomainError {
    DomainError::already_decided(format!("Invite '{}' has already been decided", id))
}

fn invited_message(team: &Team) -> String {
    format!(
        "You have been invited to {}. Accept with the tag {}",
        team.name(),
        team.tag()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    use crate::config::ChannelSettings;
    use crate::domain::invite::InviteStatus;
    use crate::domain::player::LaneRole;
    use crate::domain::team::League;
    use crate::domain::ConflictKind;
    use crate::infrastructure::platform::{InMemoryPlatformDirectory, SentMessage};
    use crate::infrastructure::services::{TeamRegistry, TransferLedger};

    struct Harness {
        backend: RosterBackend,
        directory: Arc<InMemoryPlatformDirectory>,
        workflow: InviteWorkflow,
        team: Team,
    }

    fn pid(handle: &str) -> PlayerId {
        PlayerId::new(handle).unwrap()
    }

    async fn harness(approval_required: bool) -> Harness {
        let backend = RosterBackend::in_memory();
        let directory = Arc::new(InMemoryPlatformDirectory::new());
        let platform = PlatformSync::new(
            directory.clone(),
            StdDuration::from_secs(1),
            ChannelSettings {
                moderation: Some("mod-queue".to_string()),
                announcements: None,
            },
        );
        let membership = MembershipSynchronizer::new(
            backend.store.clone(),
            TransferLedger::new(backend.transfers.clone()),
            platform.clone(),
        );

        for handle in ["cap", "rookie", "vet"] {
            let player = Player::new(pid(handle), handle, LaneRole::Support).unwrap();
            backend.players.create(player).await.unwrap();
        }

        let registry = TeamRegistry::new(&backend, membership.clone(), platform.clone(), 5);
        let (team, _) = registry
            .create_team("Blue Otters", "otr", &pid("cap"), League::Prime)
            .await
            .unwrap();

        let workflow = InviteWorkflow::new(
            &backend,
            membership,
            platform,
            ApprovalGate::new(approval_required),
            Duration::days(7),
        );

        Harness {
            backend,
            directory,
            workflow,
            team,
        }
    }

    #[tokio::test]
    async fn test_moderated_invite_flow() {
        let h = harness(true).await;
        let now = Utc::now();

        let (invite, _) = h
            .workflow
            .create_invite(h.team.id(), &pid("cap"), &pid("rookie"), now)
            .await
            .unwrap();
        assert_eq!(invite.status(now), InviteStatus::AwaitingApproval);
        assert!(h
            .directory
            .messages()
            .await
            .iter()
            .any(|m| matches!(m, SentMessage::Channel { channel, .. } if channel == "mod-queue")));

        let err = h
            .workflow
            .accept_by_tag(&pid("rookie"), "otr", now)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));

        let later = now + Duration::days(2);
        let (approved, _) = h
            .workflow
            .decide(&invite.id, true, Decider::Moderator(pid("mod")), later)
            .await
            .unwrap();
        assert_eq!(approved.approved_by, Some(pid("mod")));
        assert_eq!(approved.expires_at, later + Duration::days(7));

        let err = h
            .workflow
            .decide(&invite.id, false, Decider::Moderator(pid("mod")), later)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyDecided { .. }));

        let (accepted, _) = h
            .workflow
            .accept_by_tag(&pid("rookie"), "OTR", later)
            .await
            .unwrap();
        assert!(!accepted.active);

        let rookie = h.backend.players.get(&pid("rookie")).await.unwrap().unwrap();
        assert!(rookie.is_member_of(h.team.id()));
        let joins = h.backend.transfers.list_by_player(&pid("rookie")).await.unwrap();
        assert_eq!(joins.len(), 1);
        assert_eq!(joins[0].kind, TransferKind::PlayerJoin);
    }

    #[tokio::test]
    async fn test_unmoderated_invite_is_approved_by_inviter() {
        let h = harness(false).await;
        let now = Utc::now();

        let (invite, _) = h
            .workflow
            .create_invite(h.team.id(), &pid("cap"), &pid("rookie"), now)
            .await
            .unwrap();

        assert_eq!(invite.approved, Some(true));
        assert_eq!(invite.approved_by, Some(pid("cap")));
        assert!(h
            .directory
            .messages()
            .await
            .iter()
            .any(|m| matches!(m, SentMessage::Direct { user, .. } if user == &pid("rookie"))));
        assert!(h
            .workflow
            .list_awaiting_approval(now)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_and_expired_invites() {
        let h = harness(true).await;
        let now = Utc::now();

        h.workflow
            .create_invite(h.team.id(), &pid("cap"), &pid("rookie"), now)
            .await
            .unwrap();

        let err = h
            .workflow
            .create_invite(h.team.id(), &pid("cap"), &pid("rookie"), now)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict {
                kind: ConflictKind::DuplicateInvite,
                ..
            }
        ));

        let expired = now + Duration::days(7);
        let err = h
            .workflow
            .accept_by_tag(&pid("rookie"), "otr", expired)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(h.workflow.list_received(&pid("rookie"), expired).await.unwrap().is_empty());

        h.workflow
            .create_invite(h.team.id(), &pid("cap"), &pid("rookie"), expired)
            .await
            .unwrap();
        assert_eq!(h.workflow.list_pending(&pid("cap"), expired).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invitee_decline_frees_the_pair() {
        let h = harness(false).await;
        let now = Utc::now();

        h.workflow
            .create_invite(h.team.id(), &pid("cap"), &pid("rookie"), now)
            .await
            .unwrap();

        let (declined, _) = h
            .workflow
            .decline_by_tag(&pid("rookie"), "otr", now)
            .await
            .unwrap();
        assert_eq!(declined.status(now), InviteStatus::Declined);

        let err = h
            .workflow
            .decide(&declined.id, true, Decider::Invitee(pid("rookie")), now)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        h.workflow
            .create_invite(h.team.id(), &pid("cap"), &pid("rookie"), now)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_invite_rejections() {
        let h = harness(true).await;
        let now = Utc::now();

        let err = h
            .workflow
            .create_invite(h.team.id(), &pid("vet"), &pid("rookie"), now)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));

        let err = h
            .workflow
            .create_invite(h.team.id(), &pid("cap"), &pid("ghost"), now)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let err = h
            .workflow
            .create_invite(h.team.id(), &pid("cap"), &pid("cap"), now)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyInTeam { .. }));
    }

    #[tokio::test]
    async fn test_someone_else_cannot_answer() {
        let h = harness(false).await;
        let now = Utc::now();

        let (invite, _) = h
            .workflow
            .create_invite(h.team.id(), &pid("cap"), &pid("rookie"), now)
            .await
            .unwrap();

        let err = h
            .workflow
            .decide(&invite.id, true, Decider::Invitee(pid("vet")), now)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));
    }
}
