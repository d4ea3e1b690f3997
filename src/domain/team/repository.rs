//! Team repository trait

use async_trait::async_trait;

use super::entity::{League, Team, TeamId};
use crate::domain::player::PlayerId;
use crate::domain::DomainError;

/// Query parameters for listing teams
#[derive(Debug, Clone, Default)]
pub struct TeamQuery {
    /// Case-insensitive substring match on the team name
    pub name_contains: Option<String>,
    /// Filter by league
    pub league: Option<League>,
    /// Include archived teams
    pub include_archived: bool,
}

impl TeamQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name_filter(mut self, filter: impl Into<String>) -> Self {
        self.name_contains = Some(filter.into());
        self
    }

    pub fn with_league(mut self, league: League) -> Self {
        self.league = Some(league);
        self
    }

    pub fn including_archived(mut self) -> Self {
        self.include_archived = true;
        self
    }

    /// Check whether a team satisfies this query
    pub fn matches(&self, team: &Team) -> bool {
        if !self.include_archived && !team.is_active() {
            return false;
        }

        if let Some(league) = self.league {
            if team.league() != league {
                return false;
            }
        }

        if let Some(ref filter) = self.name_contains {
            if !team
                .name()
                .to_lowercase()
                .contains(&filter.to_lowercase())
            {
                return false;
            }
        }

        true
    }
}

/// Repository for teams
///
/// Teams are inserted inside a roster transaction together with their
/// captain's membership; this trait covers lookups and captaincy changes.
#[async_trait]
pub trait TeamRepository: Send + Sync + std::fmt::Debug {
    /// Get a team by ID, archived teams included
    async fn get(&self, id: &TeamId) -> Result<Option<Team>, DomainError>;

    /// Find a team by name (case-insensitive), archived teams included
    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, DomainError>;

    /// Find a team by tag (case-insensitive), archived teams included
    async fn find_by_tag(&self, tag: &str) -> Result<Option<Team>, DomainError>;

    /// Find the team currently captained by a player
    async fn find_by_captain(&self, captain_id: &PlayerId) -> Result<Option<Team>, DomainError>;

    /// List teams matching the query, sorted by name
    async fn list(&self, query: &TeamQuery) -> Result<Vec<Team>, DomainError>;

    /// Atomically move captaincy from `from` to `to`
    ///
    /// Returns `false` without changing anything unless the team is active,
    /// `from` is its captain and `to` is currently a member.
    async fn replace_captain(
        &self,
        id: &TeamId,
        from: &PlayerId,
        to: &PlayerId,
    ) -> Result<bool, DomainError>;
}
