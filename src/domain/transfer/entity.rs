//! Transfer ledger entries

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::player::{LaneRole, PlayerId};
use crate::domain::team::TeamId;
use crate::domain::DomainError;

/// Unique identifier for a ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(Uuid);

impl TransferId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for TransferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of membership-changing event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    PlayerJoin,
    PlayerLeave,
    TeamCreate,
    TeamDisband,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayerJoin => "player_join",
            Self::PlayerLeave => "player_leave",
            Self::TeamCreate => "team_create",
            Self::TeamDisband => "team_disband",
        }
    }

    /// Whether the event adds the player to the team
    pub fn is_join(&self) -> bool {
        matches!(self, Self::PlayerJoin | Self::TeamCreate)
    }
}

impl FromStr for TransferKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player_join" => Ok(Self::PlayerJoin),
            "player_leave" => Ok(Self::PlayerLeave),
            "team_create" => Ok(Self::TeamCreate),
            "team_disband" => Ok(Self::TeamDisband),
            other => Err(DomainError::storage(format!(
                "Unknown transfer kind '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TransferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write-once ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub kind: TransferKind,
    /// Lane the player held when the event happened
    pub lane: LaneRole,
    pub recorded_at: DateTime<Utc>,
}

impl Transfer {
    pub fn new(player_id: PlayerId, team_id: TeamId, kind: TransferKind, lane: LaneRole) -> Self {
        Self {
            id: TransferId::generate(),
            player_id,
            team_id,
            kind,
            lane,
            recorded_at: Utc::now(),
        }
    }
}
