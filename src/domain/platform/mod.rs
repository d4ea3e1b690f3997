//! Platform directory domain
//!
//! The community platform mirrors membership through roles and nicknames.
//! It is a best-effort cache of the store, so every failure here is
//! reported as a [`SyncWarning`] rather than an error.

mod sync;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::player::PlayerId;

pub use sync::{SyncStep, SyncWarning};

#[cfg(test)]
use mockall::automock;

/// Failures reported by the platform
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlatformError {
    #[error("missing platform permission: {0}")]
    PermissionDenied(String),

    #[error("member '{0}' is not present on the platform")]
    MemberNotFound(String),

    #[error("role '{0}' does not exist on the platform")]
    RoleNotFound(String),

    #[error("platform request timed out after {0:?}")]
    Timeout(Duration),

    #[error("platform transport error: {0}")]
    Transport(String),
}

/// Roles, nicknames, messages and team spaces on the community platform
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlatformDirectory: Send + Sync {
    /// Grants a named role to a user
    async fn grant_role(&self, user: &PlayerId, role: &str) -> Result<(), PlatformError>;

    /// Revokes a named role from a user
    async fn revoke_role(&self, user: &PlayerId, role: &str) -> Result<(), PlatformError>;

    /// Sets or, with `None`, clears a user's display name
    async fn set_nickname(
        &self,
        user: &PlayerId,
        nickname: Option<String>,
    ) -> Result<(), PlatformError>;

    /// Sends a direct message to a user
    async fn send_direct_message(&self, user: &PlayerId, content: &str)
        -> Result<(), PlatformError>;

    /// Posts to a channel by identifier
    async fn send_channel_message(&self, channel: &str, content: &str)
        -> Result<(), PlatformError>;

    /// Creates the team role and its text channel
    async fn provision_team_space(&self, role: &str, channel: &str) -> Result<(), PlatformError>;

    /// Removes the team role and its text channel
    async fn deprovision_team_space(&self, role: &str, channel: &str)
        -> Result<(), PlatformError>;
}
