//! Single entry point for roster commands

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use super::invite_service::{Decider, InviteWorkflow};
use super::membership::MembershipSynchronizer;
use super::platform_sync::PlatformSync;
use super::player_service::{PlayerService, UpdateProfileRequest};
use super::team_service::TeamRegistry;
use super::transfer_ledger::TransferLedger;
use crate::config::AppConfig;
use crate::domain::approval::ApprovalGate;
use crate::domain::command::{
    Command, CommandContext, CommandOutcome, CommandReply, InviteView,
};
use crate::domain::invite::Invite;
use crate::domain::platform::{PlatformDirectory, SyncWarning};
use crate::domain::DomainError;
use crate::infrastructure::storage::RosterBackend;

/// Routes each [`Command`] variant to the service that owns it
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    players: PlayerService,
    teams: TeamRegistry,
    invites: InviteWorkflow,
    ledger: TransferLedger,
}

impl CommandDispatcher {
    /// Wire every roster service over one backend and platform directory
    pub fn new(
        backend: &RosterBackend,
        directory: Arc<dyn PlatformDirectory>,
        config: &AppConfig,
    ) -> Self {
        let platform = PlatformSync::new(
            directory,
            Duration::from_secs(config.platform.request_timeout_secs),
            config.channels.clone(),
        );
        let ledger = TransferLedger::new(backend.transfers.clone());
        let membership =
            MembershipSynchronizer::new(backend.store.clone(), ledger.clone(), platform.clone());

        Self {
            players: PlayerService::new(backend.players.clone()),
            teams: TeamRegistry::new(
                backend,
                membership.clone(),
                platform.clone(),
                config.roster.tag_max_length,
            ),
            invites: InviteWorkflow::new(
                backend,
                membership,
                platform,
                ApprovalGate::new(config.roster.approval_required),
                chrono::Duration::days(config.roster.invite_validity_days),
            ),
            ledger,
        }
    }

    /// Execute a command on behalf of `ctx.actor`
    pub async fn dispatch(
        &self,
        ctx: &CommandContext,
        command: Command,
    ) -> Result<CommandReply, DomainError> {
        let name = command.name();
        let started = Instant::now();

        debug!(request_id = %ctx.request_id, actor = %ctx.actor, command = name, "Dispatching command");

        let result = self.execute(ctx, command).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(reply) => info!(
                request_id = %ctx.request_id,
                actor = %ctx.actor,
                command = name,
                warnings = reply.warnings.len(),
                elapsed_ms,
                "Command completed"
            ),
            Err(e) if e.is_domain() => info!(
                request_id = %ctx.request_id,
                actor = %ctx.actor,
                command = name,
                error = %e,
                elapsed_ms,
                "Command rejected"
            ),
            Err(e) => error!(
                request_id = %ctx.request_id,
                actor = %ctx.actor,
                command = name,
                error = %e,
                elapsed_ms,
                "Command failed"
            ),
        }

        result
    }

    async fn execute(
        &self,
        ctx: &CommandContext,
        command: Command,
    ) -> Result<CommandReply, DomainError> {
        if command.requires_registered_actor() && !self.players.exists(&ctx.actor).await? {
            return Err(DomainError::not_found(format!(
                "Player '{}' is not registered",
                ctx.actor
            )));
        }

        match command {
            Command::RegisterPlayer { nickname, lane } => {
                let player = self
                    .players
                    .register(ctx.actor.clone(), &nickname, lane)
                    .await?;
                Ok(CommandReply::new(CommandOutcome::Player { player }))
            }

            Command::ShowProfile { handle } => {
                let id = match handle {
                    Some(handle) => PlayerService::parse_handle(&handle)?,
                    None => ctx.actor.clone(),
                };
                let player = self.players.require(&id).await?;
                let team = match player.team_id() {
                    Some(team_id) => self.teams.get(team_id).await?,
                    None => None,
                };
                Ok(CommandReply::new(CommandOutcome::Profile { player, team }))
            }

            Command::UpdateProfile {
                nickname,
                lane,
                bio,
            } => {
                let player = self
                    .players
                    .update_profile(&ctx.actor, UpdateProfileRequest { nickname, lane, bio })
                    .await?;
                Ok(CommandReply::new(CommandOutcome::Player { player }))
            }

            Command::PlayerHistory { handle } => {
                let id = match handle {
                    Some(handle) => PlayerService::parse_handle(&handle)?,
                    None => ctx.actor.clone(),
                };
                let player = self.players.require(&id).await?;
                let transfers = self.ledger.for_player(player.id()).await?;
                Ok(CommandReply::new(CommandOutcome::PlayerHistory { player, transfers }))
            }

            Command::SetPremium { handle, premium } => {
                require_moderator(ctx)?;

                let id = PlayerService::parse_handle(&handle)?;
                let player = self.players.set_premium(&id, premium).await?;
                Ok(CommandReply::new(CommandOutcome::Player { player }))
            }

            Command::ListFreeAgents => {
                let players = self.players.list_free_agents().await?;
                Ok(CommandReply::new(CommandOutcome::Players { players }))
            }

            Command::CreateTeam {
                name,
                tag,
                captain,
                league,
            } => {
                let captain = PlayerService::parse_handle(&captain)?;
                if captain != ctx.actor && !ctx.is_moderator {
                    return Err(DomainError::permission_denied(
                        "Only moderators can create a team for someone else",
                    ));
                }

                let (team, warnings) = self
                    .teams
                    .create_team(&name, &tag, &captain, league.unwrap_or_default())
                    .await?;
                Ok(CommandReply::new(CommandOutcome::Team { team }).with_warnings(warnings))
            }

            Command::ArchiveTeam { search_term } => {
                let team = self.teams.search(&search_term).await?;

                // Archival clears the captain; re-archiving is a no-op for anyone
                if !team.is_active() {
                    return Ok(CommandReply::new(CommandOutcome::Team { team }));
                }

                if !ctx.is_moderator && !team.is_captain(&ctx.actor) {
                    return Err(DomainError::permission_denied(format!(
                        "Only the captain of '{}' or a moderator can archive it",
                        team.name()
                    )));
                }

                let (team, warnings) = self.teams.archive_team(team.id()).await?;
                Ok(CommandReply::new(CommandOutcome::Team { team }).with_warnings(warnings))
            }

            Command::TransferOwnership { new_owner } => {
                let new_owner = PlayerService::parse_handle(&new_owner)?;
                let team = self.teams.captained_by(&ctx.actor).await?;

                let (team, warnings) = self
                    .teams
                    .transfer_captaincy(team.id(), &ctx.actor, &new_owner)
                    .await?;
                Ok(CommandReply::new(CommandOutcome::Team { team }).with_warnings(warnings))
            }

            Command::ListTeams { name_filter } => {
                if let Some(filter) = name_filter.as_deref() {
                    if let Some(team) = self.teams.find_by_name(filter).await? {
                        if team.is_active() {
                            let members = self.teams.members(team.id()).await?;
                            return Ok(CommandReply::new(CommandOutcome::Roster { team, members }));
                        }
                    }
                }

                let teams = self.teams.list_active(name_filter.as_deref()).await?;
                Ok(CommandReply::new(CommandOutcome::Teams { teams }))
            }

            Command::TeamHistory {
                search_term,
                from,
                to,
            } => {
                let team = self.teams.search(&search_term).await?;
                let transfers = match (from, to) {
                    (None, None) => self.ledger.for_team(team.id()).await?,
                    (from, to) => {
                        self.ledger
                            .for_team_between(
                                team.id(),
                                from.unwrap_or_else(|| team.created_at()),
                                to.unwrap_or(ctx.now),
                            )
                            .await?
                    }
                };
                Ok(CommandReply::new(CommandOutcome::History { team, transfers }))
            }

            Command::SendInvite { invitee } => {
                let invitee = PlayerService::parse_handle(&invitee)?;
                let team = self.teams.captained_by(&ctx.actor).await?;

                let (invite, warnings) = self
                    .invites
                    .create_invite(team.id(), &ctx.actor, &invitee, ctx.now)
                    .await?;
                Ok(invite_reply(invite, warnings, ctx))
            }

            Command::AcceptInvite { team_tag } => {
                let (invite, warnings) = self
                    .invites
                    .accept_by_tag(&ctx.actor, &team_tag, ctx.now)
                    .await?;
                Ok(invite_reply(invite, warnings, ctx))
            }

            Command::DeclineInvite { team_tag } => {
                let (invite, warnings) = self
                    .invites
                    .decline_by_tag(&ctx.actor, &team_tag, ctx.now)
                    .await?;
                Ok(invite_reply(invite, warnings, ctx))
            }

            Command::ListPendingInvites => {
                let invites = self.invites.list_pending(&ctx.actor, ctx.now).await?;
                Ok(invites_reply(invites, ctx))
            }

            Command::ListReceivedInvites => {
                let invites = self.invites.list_received(&ctx.actor, ctx.now).await?;
                Ok(invites_reply(invites, ctx))
            }

            Command::ModerateInvite { invite_id, approve } => {
                require_moderator(ctx)?;

                let (invite, warnings) = self
                    .invites
                    .decide(
                        &invite_id,
                        approve,
                        Decider::Moderator(ctx.actor.clone()),
                        ctx.now,
                    )
                    .await?;
                Ok(invite_reply(invite, warnings, ctx))
            }

            Command::ListAwaitingApproval => {
                require_moderator(ctx)?;

                let invites = self.invites.list_awaiting_approval(ctx.now).await?;
                Ok(invites_reply(invites, ctx))
            }

            Command::LeaveTeam => {
                let (team, warnings) = self.teams.leave_team(&ctx.actor).await?;
                Ok(CommandReply::new(CommandOutcome::Done {
                    message: format!("You left {}", team.name()),
                })
                .with_warnings(warnings))
            }

            Command::KickMember { member } => {
                let member = PlayerService::parse_handle(&member)?;
                let (team, warnings) = self.teams.kick_member(&ctx.actor, &member).await?;
                Ok(CommandReply::new(CommandOutcome::Done {
                    message: format!("{} was removed from {}", member, team.name()),
                })
                .with_warnings(warnings))
            }

            Command::MemberDeparted { handle } => {
                require_moderator(ctx)?;

                let id = PlayerService::parse_handle(&handle)?;
                Ok(match self.teams.member_departed(&id).await? {
                    Some((team, warnings)) => {
                        CommandReply::new(CommandOutcome::Team { team }).with_warnings(warnings)
                    }
                    None => CommandReply::new(CommandOutcome::Done {
                        message: format!("{} was not on a team", id),
                    }),
                })
            }

            Command::MemberRejoined { handle } => {
                require_moderator(ctx)?;

                let id = PlayerService::parse_handle(&handle)?;
                Ok(match self.teams.member_rejoined(&id).await? {
                    Some((team, warnings)) => {
                        CommandReply::new(CommandOutcome::Team { team }).with_warnings(warnings)
                    }
                    None => CommandReply::new(CommandOutcome::Done {
                        message: format!("{} has no team to restore", id),
                    }),
                })
            }
        }
    }
}

fn require_moderator(ctx: &CommandContext) -> Result<(), DomainError> {
    if ctx.is_moderator {
        Ok(())
    } else {
        Err(DomainError::permission_denied("Only moderators can do that"))
    }
}

fn invite_reply(invite: Invite, warnings: Vec<SyncWarning>, ctx: &CommandContext) -> CommandReply {
    CommandReply::new(CommandOutcome::Invite {
        invite: InviteView::new(invite, ctx.now),
    })
    .with_warnings(warnings)
}

fn invites_reply(invites: Vec<Invite>, ctx: &CommandContext) -> CommandReply {
    let invites = invites
        .into_iter()
        .map(|invite| InviteView::new(invite, ctx.now))
        .collect();
    CommandReply::new(CommandOutcome::Invites { invites })
}
