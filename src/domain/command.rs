//! Command surface of the roster
//!
//! Every user-facing operation is one variant of [`Command`]; a presentation
//! layer only has to build a command and a [`CommandContext`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::invite::{Invite, InviteId, InviteStatus};
use crate::domain::platform::SyncWarning;
use crate::domain::player::{LaneRole, Player, PlayerId};
use crate::domain::team::{League, Team};
use crate::domain::transfer::Transfer;

/// Closed set of roster commands, tagged by `"command"` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum Command {
    #[serde(rename = "player.register")]
    RegisterPlayer { nickname: String, lane: LaneRole },

    #[serde(rename = "player.profile")]
    ShowProfile {
        #[serde(default)]
        handle: Option<String>,
    },

    #[serde(rename = "player.update_profile")]
    UpdateProfile {
        #[serde(default)]
        nickname: Option<String>,
        #[serde(default)]
        lane: Option<LaneRole>,
        #[serde(default)]
        bio: Option<String>,
    },

    #[serde(rename = "player.history")]
    PlayerHistory {
        #[serde(default)]
        handle: Option<String>,
    },

    #[serde(rename = "player.set_premium")]
    SetPremium { handle: String, premium: bool },

    #[serde(rename = "player.list_free_agents")]
    ListFreeAgents,

    #[serde(rename = "team.create")]
    CreateTeam {
        name: String,
        tag: String,
        captain: String,
        #[serde(default)]
        league: Option<League>,
    },

    #[serde(rename = "team.archive")]
    ArchiveTeam { search_term: String },

    #[serde(rename = "team.transfer_ownership")]
    TransferOwnership { new_owner: String },

    #[serde(rename = "team.list")]
    ListTeams {
        #[serde(default)]
        name_filter: Option<String>,
    },

    #[serde(rename = "team.history")]
    TeamHistory {
        search_term: String,
        #[serde(default)]
        from: Option<DateTime<Utc>>,
        #[serde(default)]
        to: Option<DateTime<Utc>>,
    },

    #[serde(rename = "invite.send")]
    SendInvite { invitee: String },

    #[serde(rename = "invite.accept")]
    AcceptInvite { team_tag: String },

    #[serde(rename = "invite.decline")]
    DeclineInvite { team_tag: String },

    #[serde(rename = "invite.list_pending")]
    ListPendingInvites,

    #[serde(rename = "invite.list_received")]
    ListReceivedInvites,

    #[serde(rename = "invite.moderate")]
    ModerateInvite { invite_id: InviteId, approve: bool },

    #[serde(rename = "invite.list_awaiting_approval")]
    ListAwaitingApproval,

    #[serde(rename = "membership.leave")]
    LeaveTeam,

    #[serde(rename = "membership.kick")]
    KickMember { member: String },

    /// Platform event: the user left the community
    #[serde(rename = "membership.departed")]
    MemberDeparted { handle: String },

    /// Platform event: the user came back to the community
    #[serde(rename = "membership.rejoined")]
    MemberRejoined { handle: String },
}

impl Command {
    /// Wire name of the command, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterPlayer { .. } => "player.register",
            Self::ShowProfile { .. } => "player.profile",
            Self::UpdateProfile { .. } => "player.update_profile",
            Self::PlayerHistory { .. } => "player.history",
            Self::SetPremium { .. } => "player.set_premium",
            Self::ListFreeAgents => "player.list_free_agents",
            Self::CreateTeam { .. } => "team.create",
            Self::ArchiveTeam { .. } => "team.archive",
            Self::TransferOwnership { .. } => "team.transfer_ownership",
            Self::ListTeams { .. } => "team.list",
            Self::TeamHistory { .. } => "team.history",
            Self::SendInvite { .. } => "invite.send",
            Self::AcceptInvite { .. } => "invite.accept",
            Self::DeclineInvite { .. } => "invite.decline",
            Self::ListPendingInvites => "invite.list_pending",
            Self::ListReceivedInvites => "invite.list_received",
            Self::ModerateInvite { .. } => "invite.moderate",
            Self::ListAwaitingApproval => "invite.list_awaiting_approval",
            Self::LeaveTeam => "membership.leave",
            Self::KickMember { .. } => "membership.kick",
            Self::MemberDeparted { .. } => "membership.departed",
            Self::MemberRejoined { .. } => "membership.rejoined",
        }
    }

    /// Registration and platform events may come from an unregistered actor
    pub fn requires_registered_actor(&self) -> bool {
        !matches!(
            self,
            Self::RegisterPlayer { .. } | Self::MemberDeparted { .. } | Self::MemberRejoined { .. }
        )
    }
}

/// Who issues a command, and when
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub actor: PlayerId,
    pub is_moderator: bool,
    pub now: DateTime<Utc>,
    pub request_id: String,
}

impl CommandContext {
    pub fn new(actor: PlayerId, request_id: impl Into<String>) -> Self {
        Self {
            actor,
            is_moderator: false,
            now: Utc::now(),
            request_id: request_id.into(),
        }
    }

    pub fn as_moderator(mut self) -> Self {
        self.is_moderator = true;
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// Invite as shown to a caller, with its status at request time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InviteView {
    #[serde(flatten)]
    pub invite: Invite,
    pub status: InviteStatus,
}

impl InviteView {
    pub fn new(invite: Invite, now: DateTime<Utc>) -> Self {
        let status = invite.status(now);
        Self { invite, status }
    }
}

/// Payload of a successful command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutcome {
    Player { player: Player },
    Players { players: Vec<Player> },
    Profile { player: Player, team: Option<Team> },
    PlayerHistory { player: Player, transfers: Vec<Transfer> },
    Team { team: Team },
    Teams { teams: Vec<Team> },
    Roster { team: Team, members: Vec<Player> },
    Invite { invite: InviteView },
    Invites { invites: Vec<InviteView> },
    History { team: Team, transfers: Vec<Transfer> },
    Done { message: String },
}

/// Result of a command plus any platform steps that did not go through
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandReply {
    pub result: CommandOutcome,
    pub warnings: Vec<SyncWarning>,
}

impl CommandReply {
    pub fn new(result: CommandOutcome) -> Self {
        Self {
            result,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<SyncWarning>) -> Self {
        self.warnings = warnings;
        self
    }
}
