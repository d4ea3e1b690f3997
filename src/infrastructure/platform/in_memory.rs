//! In-memory platform directory for development and tests

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::platform::{PlatformDirectory, PlatformError};
use crate::domain::player::PlayerId;

/// Message delivered through the in-memory directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Direct { user: PlayerId, content: String },
    Channel { channel: String, content: String },
}

#[derive(Debug, Default)]
struct DirectoryState {
    roles: HashMap<PlayerId, HashSet<String>>,
    nicknames: HashMap<PlayerId, String>,
    spaces: HashSet<String>,
    messages: Vec<SentMessage>,
    absent: HashSet<PlayerId>,
}

/// Platform directory that keeps roles, nicknames and messages in memory
///
/// Every user is treated as a guild member unless marked absent.
#[derive(Debug, Default)]
pub struct InMemoryPlatformDirectory {
    state: RwLock<DirectoryState>,
}

impl InMemoryPlatformDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a user who left the guild
    pub async fn mark_absent(&self, user: &PlayerId) {
        self.state.write().await.absent.insert(user.clone());
    }

    pub async fn roles_of(&self, user: &PlayerId) -> HashSet<String> {
        self.state
            .read()
            .await
            .roles
            .get(user)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn nickname_of(&self, user: &PlayerId) -> Option<String> {
        self.state.read().await.nicknames.get(user).cloned()
    }

    pub async fn has_space(&self, role: &str) -> bool {
        self.state.read().await.spaces.contains(role)
    }

    pub async fn messages(&self) -> Vec<SentMessage> {
        self.state.read().await.messages.clone()
    }

    fn ensure_present(state: &DirectoryState, user: &PlayerId) -> Result<(), PlatformError> {
        if state.absent.contains(user) {
            return Err(PlatformError::MemberNotFound(user.to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl PlatformDirectory for InMemoryPlatformDirectory {
    async fn grant_role(&self, user: &PlayerId, role: &str) -> Result<(), PlatformError> {
        let mut state = self.state.write().await;
        Self::ensure_present(&state, user)?;

        if !state.spaces.contains(role) {
            return Err(PlatformError::RoleNotFound(role.to_string()));
        }

        state
            .roles
            .entry(user.clone())
            .or_default()
            .insert(role.to_string());
        Ok(())
    }

    async fn revoke_role(&self, user: &PlayerId, role: &str) -> Result<(), PlatformError> {
        let mut state = self.state.write().await;
        Self::ensure_present(&state, user)?;

        if let Some(roles) = state.roles.get_mut(user) {
            roles.remove(role);
        }

        Ok(())
    }

    async fn set_nickname(
        &self,
        user: &PlayerId,
        nickname: Option<String>,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.write().await;
        Self::ensure_present(&state, user)?;

        match nickname {
            Some(nickname) => {
                state.nicknames.insert(user.clone(), nickname);
            }
            None => {
                state.nicknames.remove(user);
            }
        }

        Ok(())
    }

    async fn send_direct_message(
        &self,
        user: &PlayerId,
        content: &str,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.write().await;
        Self::ensure_present(&state, user)?;

        state.messages.push(SentMessage::Direct {
            user: user.clone(),
            content: content.to_string(),
        });
        Ok(())
    }

    async fn send_channel_message(&self, channel: &str, content: &str) -> Result<(), PlatformError> {
        self.state.write().await.messages.push(SentMessage::Channel {
            channel: channel.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }

    async fn provision_team_space(&self, role: &str, _channel: &str) -> Result<(), PlatformError> {
        self.state.write().await.spaces.insert(role.to_string());
        Ok(())
    }

    async fn deprovision_team_space(&self, role: &str, _channel: &str) -> Result<(), PlatformError> {
        let mut state = self.state.write().await;
        state.spaces.remove(role);

        for roles in state.roles.values_mut() {
            roles.remove(role);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_grant_requires_provisioned_role() {
        let directory = InMemoryPlatformDirectory::new();
        let user = PlayerId::new("1001").unwrap();

        let err = directory.grant_role(&user, "Blue Otters").await.unwrap_err();
        assert_eq!(err, PlatformError::RoleNotFound("Blue Otters".to_string()));

        directory.provision_team_space("Blue Otters", "otr").await.unwrap();
        directory.grant_role(&user, "Blue Otters").await.unwrap();
        assert!(directory.roles_of(&user).await.contains("Blue Otters"));
    }

    #[tokio::test]
    async fn test_absent_member_is_reported() {
        let directory = InMemoryPlatformDirectory::new();
        let user = PlayerId::new("1001").unwrap();
        directory.mark_absent(&user).await;

        let err = directory
            .set_nickname(&user, Some("[OTR] Faker".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err, PlatformError::MemberNotFound("1001".to_string()));
    }

    #[tokio::test]
    async fn test_deprovision_strips_role_from_members() {
        let directory = InMemoryPlatformDirectory::new();
        let user = PlayerId::new("1001").unwrap();
        directory.provision_team_space("Blue Otters", "otr").await.unwrap();
        directory.grant_role(&user, "Blue Otters").await.unwrap();

        directory.deprovision_team_space("Blue Otters", "otr").await.unwrap();

        assert!(directory.roles_of(&user).await.is_empty());
        assert!(!directory.has_space("Blue Otters").await);
    }
}
