//! Team entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{validate_team_name, validate_team_tag, TeamValidationError};
use crate::domain::player::{PlayerId, MAX_NICKNAME_LENGTH};

/// Team identifier - surrogate UUID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(Uuid);

impl TeamId {
    /// Generate a fresh identifier
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

impl FromStr for TeamId {
    type Err = TeamValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| TeamValidationError::InvalidId(e.to_string()))
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// League a team competes in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum League {
    #[default]
    Prime,
    Surrogate,
    Trine,
}

impl League {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prime => "prime",
            Self::Surrogate => "surrogate",
            Self::Trine => "trine",
        }
    }
}

impl FromStr for League {
    type Err = TeamValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prime" => Ok(Self::Prime),
            "surrogate" => Ok(Self::Surrogate),
            "trine" => Ok(Self::Trine),
            other => Err(TeamValidationError::UnknownLeague(other.to_string())),
        }
    }
}

impl std::fmt::Display for League {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Team entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier
    id: TeamId,
    /// Display name, unique across active and archived teams
    name: String,
    /// Short upper-case tag, unique across active and archived teams
    tag: String,
    /// Current captain, always a member of this team
    #[serde(skip_serializing_if = "Option::is_none")]
    captain_id: Option<PlayerId>,
    league: League,
    active: bool,
    created_at: DateTime<Utc>,
}

impl Team {
    /// Create a new active team captained by `captain_id`
    pub fn new(
        name: impl Into<String>,
        tag: impl AsRef<str>,
        captain_id: PlayerId,
        league: League,
        tag_max_length: usize,
    ) -> Result<Self, TeamValidationError> {
        let name = name.into().trim().to_string();
        validate_team_name(&name)?;

        let tag = normalize_tag(tag.as_ref());
        validate_team_tag(&tag, tag_max_length)?;

        Ok(Self {
            id: TeamId::generate(),
            name,
            tag,
            captain_id: Some(captain_id),
            league,
            active: true,
            created_at: Utc::now(),
        })
    }

    /// Rebuild a team from a persisted row
    pub(crate) fn from_storage(
        id: TeamId,
        name: String,
        tag: String,
        captain_id: Option<PlayerId>,
        league: League,
        active: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            tag,
            captain_id,
            league,
            active,
            created_at,
        }
    }

    // Getters

    pub fn id(&self) -> &TeamId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn captain_id(&self) -> Option<&PlayerId> {
        self.captain_id.as_ref()
    }

    pub fn league(&self) -> League {
        self.league
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Check if the given player captains this team
    pub fn is_captain(&self, player_id: &PlayerId) -> bool {
        self.captain_id.as_ref() == Some(player_id)
    }

    /// Name of the platform role mirroring membership
    pub fn role_name(&self) -> &str {
        &self.name
    }

    /// Name of the team's text channel on the platform
    pub fn channel_name(&self) -> String {
        self.tag.to_ascii_lowercase()
    }

    /// Nickname a member carries on the platform: `[TAG] nickname`
    pub fn member_nickname(&self, nickname: &str) -> String {
        format!("[{}] {}", self.tag, nickname)
            .chars()
            .take(MAX_NICKNAME_LENGTH)
            .collect()
    }

    // Mutators

    pub(crate) fn set_captain(&mut self, captain_id: Option<PlayerId>) {
        self.captain_id = captain_id;
    }

    /// Soft-delete: the row is kept so ledger entries stay resolvable
    pub(crate) fn archive(&mut self) {
        self.captain_id = None;
        self.active = false;
    }
}

/// Tags are stored upper-case so lookups are case-insensitive
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captain() -> PlayerId {
        PlayerId::new("p1").unwrap()
    }

    #[test]
    fn test_team_creation() {
        let team = Team::new("Falcons", "flc", captain(), League::Prime, 5).unwrap();

        assert_eq!(team.name(), "Falcons");
        assert_eq!(team.tag(), "FLC");
        assert!(team.is_active());
        assert!(team.is_captain(&captain()));
        assert_eq!(team.league(), League::Prime);
    }

    #[test]
    fn test_team_tag_limit_is_configurable() {
        assert!(Team::new("Falcons", "FALCON", captain(), League::Prime, 5).is_err());
        assert!(Team::new("Falcons", "FALCON", captain(), League::Prime, 6).is_ok());
    }

    #[test]
    fn test_team_invalid_name() {
        assert!(Team::new("", "FLC", captain(), League::Prime, 5).is_err());
    }

    #[test]
    fn test_archive_clears_captain() {
        let mut team = Team::new("Falcons", "FLC", captain(), League::Prime, 5).unwrap();
        team.archive();

        assert!(!team.is_active());
        assert!(team.captain_id().is_none());
    }

    #[test]
    fn test_member_nickname() {
        let team = Team::new("Falcons", "FLC", captain(), League::Prime, 5).unwrap();
        assert_eq!(team.member_nickname("Caps"), "[FLC] Caps");

        let long = team.member_nickname(&"n".repeat(40));
        assert_eq!(long.chars().count(), 32);
    }

    #[test]
    fn test_league_parsing() {
        assert_eq!("Prime".parse::<League>().unwrap(), League::Prime);
        assert_eq!("TRINE".parse::<League>().unwrap(), League::Trine);
        assert!("bronze".parse::<League>().is_err());
    }

    #[test]
    fn test_team_id_parse() {
        let id = TeamId::generate();
        let parsed: TeamId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<TeamId>().is_err());
    }
}
