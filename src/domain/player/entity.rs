//! Player entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    validate_bio, validate_nickname, validate_player_handle, PlayerValidationError,
};
use crate::domain::team::TeamId;

/// Player identifier - the platform user handle
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a new PlayerId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, PlayerValidationError> {
        let id = id.into();
        validate_player_handle(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlayerId {
    type Error = PlayerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lane a player registers for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneRole {
    Top,
    Jungle,
    Mid,
    Adc,
    Support,
}

impl LaneRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Jungle => "jungle",
            Self::Mid => "mid",
            Self::Adc => "adc",
            Self::Support => "support",
        }
    }
}

impl FromStr for LaneRole {
    type Err = PlayerValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "jungle" | "jgl" => Ok(Self::Jungle),
            "mid" => Ok(Self::Mid),
            "adc" | "bot" => Ok(Self::Adc),
            "support" | "sup" => Ok(Self::Support),
            other => Err(PlayerValidationError::UnknownLane(other.to_string())),
        }
    }
}

impl std::fmt::Display for LaneRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Player entity
///
/// `team_id` is only ever changed by the membership protocol, never by
/// profile updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    team_id: Option<TeamId>,
    lane: LaneRole,
    nickname: String,
    premium: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    bio: Option<String>,
    registered_at: DateTime<Utc>,
}

impl Player {
    /// Register a new player without a team
    pub fn new(
        id: PlayerId,
        nickname: impl Into<String>,
        lane: LaneRole,
    ) -> Result<Self, PlayerValidationError> {
        let nickname = nickname.into();
        validate_nickname(&nickname)?;

        Ok(Self {
            id,
            team_id: None,
            lane,
            nickname,
            premium: false,
            bio: None,
            registered_at: Utc::now(),
        })
    }

    /// Rebuild a player from a persisted row
    pub(crate) fn from_storage(
        id: PlayerId,
        team_id: Option<TeamId>,
        lane: LaneRole,
        nickname: String,
        premium: bool,
        bio: Option<String>,
        registered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            team_id,
            lane,
            nickname,
            premium,
            bio,
            registered_at,
        }
    }

    // Getters

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn team_id(&self) -> Option<&TeamId> {
        self.team_id.as_ref()
    }

    pub fn lane(&self) -> LaneRole {
        self.lane
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn is_premium(&self) -> bool {
        self.premium
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Check whether the player currently belongs to the given team
    pub fn is_member_of(&self, team_id: &TeamId) -> bool {
        self.team_id.as_ref() == Some(team_id)
    }

    // Mutators

    pub fn set_nickname(&mut self, nickname: impl Into<String>) -> Result<(), PlayerValidationError> {
        let nickname = nickname.into();
        validate_nickname(&nickname)?;
        self.nickname = nickname;
        Ok(())
    }

    pub fn set_lane(&mut self, lane: LaneRole) {
        self.lane = lane;
    }

    pub fn set_bio(&mut self, bio: Option<String>) -> Result<(), PlayerValidationError> {
        if let Some(ref bio) = bio {
            validate_bio(bio)?;
        }
        self.bio = bio;
        Ok(())
    }

    pub fn set_premium(&mut self, premium: bool) {
        self.premium = premium;
    }

    pub(crate) fn assign_team(&mut self, team_id: Option<TeamId>) {
        self.team_id = team_id;
    }
}
