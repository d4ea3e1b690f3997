//! Invite domain entities

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::player::PlayerId;
use crate::domain::team::TeamId;

/// Unique identifier for an invite
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteId(Uuid);

impl InviteId {
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

impl FromStr for InviteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for InviteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an invite, evaluated at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    /// Waiting for a moderator decision
    AwaitingApproval,
    /// Approved; the invitee may accept or decline
    Approved,
    /// Declined by the invitee or rejected by a moderator
    Declined,
    /// Still flagged active but past `expires_at`
    Expired,
    /// Accepted or retired; no longer actionable
    Closed,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingApproval => "awaiting_approval",
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Expired => "expired",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invitation of a player to a team
///
/// `approved` is tri-state: `None` while pending moderation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invite {
    pub id: InviteId,
    pub inviter_id: PlayerId,
    pub invitee_id: PlayerId,
    pub team_id: TeamId,
    pub approved: Option<bool>,
    pub active: bool,
    pub expires_at: DateTime<Utc>,
    pub approved_by: Option<PlayerId>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    /// Create a pending invite valid for `validity` from `now`
    pub fn new(
        team_id: TeamId,
        inviter_id: PlayerId,
        invitee_id: PlayerId,
        now: DateTime<Utc>,
        validity: Duration,
    ) -> Self {
        Self {
            id: InviteId::generate(),
            inviter_id,
            invitee_id,
            team_id,
            approved: None,
            active: true,
            expires_at: now + validity,
            approved_by: None,
            approved_at: None,
            created_at: now,
        }
    }

    /// Expiry is evaluated lazily: an active invite past `expires_at` is dead
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Active and not expired
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.active && !self.is_expired(now)
    }

    pub fn is_pending(&self) -> bool {
        self.approved.is_none()
    }

    pub fn status(&self, now: DateTime<Utc>) -> InviteStatus {
        if !self.active {
            return match self.approved {
                Some(false) => InviteStatus::Declined,
                _ => InviteStatus::Closed,
            };
        }

        if self.is_expired(now) {
            return InviteStatus::Expired;
        }

        match self.approved {
            None => InviteStatus::AwaitingApproval,
            Some(true) => InviteStatus::Approved,
            Some(false) => InviteStatus::Declined,
        }
    }

    /// Approve and restart the validity window
    pub fn approve(&mut self, approved_by: PlayerId, now: DateTime<Utc>, validity: Duration) {
        self.approved = Some(true);
        self.approved_by = Some(approved_by);
        self.approved_at = Some(now);
        self.expires_at = now + validity;
    }

    pub fn decline(&mut self) {
        self.approved = Some(false);
        self.active = false;
    }

    /// Terminal: the invitee joined, or the invite was superseded
    pub fn close(&mut self) {
        self.active = false;
    }
}
