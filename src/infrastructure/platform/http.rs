//! Discord-compatible REST implementation of the platform directory

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::domain::platform::{PlatformDirectory, PlatformError};
use crate::domain::player::PlayerId;
use crate::domain::DomainError;

/// Connection settings of the REST directory
#[derive(Debug, Clone)]
pub struct HttpDirectoryConfig {
    pub base_url: String,
    pub guild_id: String,
    pub token: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct NamedObject {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ChannelRef {
    id: String,
}

/// Platform directory speaking the guild REST API with a bot token
#[derive(Debug, Clone)]
pub struct HttpPlatformDirectory {
    client: Client,
    config: HttpDirectoryConfig,
}

impl HttpPlatformDirectory {
    pub fn new(config: HttpDirectoryConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);

        self.client
            .request(method, url)
            .header("Authorization", format!("Bot {}", self.config.token))
    }

    fn guild_path(&self, suffix: &str) -> String {
        format!("/guilds/{}{}", self.config.guild_id, suffix)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        missing: impl FnOnce() -> PlatformError,
    ) -> Result<Response, PlatformError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PlatformError::Timeout(self.config.request_timeout)
            } else {
                PlatformError::Transport(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: String = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(200)
            .collect();
        debug!(status = status.as_u16(), body = %body, "Platform request rejected");

        Err(match status {
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                PlatformError::PermissionDenied(format!("HTTP {}: {}", status.as_u16(), body))
            }
            StatusCode::NOT_FOUND => missing(),
            _ => PlatformError::Transport(format!("HTTP {}: {}", status.as_u16(), body)),
        })
    }

    async fn list_named(&self, suffix: &str) -> Result<Vec<NamedObject>, PlatformError> {
        let path = self.guild_path(suffix);
        let response = self
            .send(self.request(Method::GET, &path), || {
                PlatformError::Transport(format!("Unknown guild '{}'", self.config.guild_id))
            })
            .await?;

        response
            .json()
            .await
            .map_err(|e| PlatformError::Transport(format!("Failed to parse response: {}", e)))
    }

    async fn role_id(&self, role: &str) -> Result<String, PlatformError> {
        self.list_named("/roles")
            .await?
            .into_iter()
            .find(|r| r.name == role)
            .map(|r| r.id)
            .ok_or_else(|| PlatformError::RoleNotFound(role.to_string()))
    }

    async fn member_role(
        &self,
        method: Method,
        user: &PlayerId,
        role: &str,
    ) -> Result<(), PlatformError> {
        let role_id = self.role_id(role).await?;
        let path = self.guild_path(&format!("/members/{}/roles/{}", user, role_id));

        self.send(self.request(method, &path), || {
            PlatformError::MemberNotFound(user.to_string())
        })
        .await?;

        Ok(())
    }

    async fn post_message(&self, channel_id: &str, content: &str) -> Result<(), PlatformError> {
        let path = format!("/channels/{}/messages", channel_id);

        self.send(
            self.request(Method::POST, &path).json(&json!({ "content": content })),
            || PlatformError::Transport(format!("Unknown channel '{}'", channel_id)),
        )
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PlatformDirectory for HttpPlatformDirectory {
    async fn grant_role(&self, user: &PlayerId, role: &str) -> Result<(), PlatformError> {
        self.member_role(Method::PUT, user, role).await
    }

    async fn revoke_role(&self, user: &PlayerId, role: &str) -> Result<(), PlatformError> {
        self.member_role(Method::DELETE, user, role).await
    }

    async fn set_nickname(
        &self,
        user: &PlayerId,
        nickname: Option<String>,
    ) -> Result<(), PlatformError> {
        let path = self.guild_path(&format!("/members/{}", user));

        self.send(
            self.request(Method::PATCH, &path).json(&json!({ "nick": nickname })),
            || PlatformError::MemberNotFound(user.to_string()),
        )
        .await?;

        Ok(())
    }

    async fn send_direct_message(
        &self,
        user: &PlayerId,
        content: &str,
    ) -> Result<(), PlatformError> {
        let response = self
            .send(
                self.request(Method::POST, "/users/@me/channels")
                    .json(&json!({ "recipient_id": user.as_str() })),
                || PlatformError::MemberNotFound(user.to_string()),
            )
            .await?;

        let channel: ChannelRef = response
            .json()
            .await
            .map_err(|e| PlatformError::Transport(format!("Failed to parse response: {}", e)))?;

        self.post_message(&channel.id, content).await
    }

    async fn send_channel_message(&self, channel: &str, content: &str) -> Result<(), PlatformError> {
        self.post_message(channel, content).await
    }

    async fn provision_team_space(&self, role: &str, channel: &str) -> Result<(), PlatformError> {
        let roles_path = self.guild_path("/roles");
        self.send(
            self.request(Method::POST, &roles_path)
                .json(&json!({ "name": role, "mentionable": true })),
            || PlatformError::Transport("Unknown guild".to_string()),
        )
        .await?;

        let channels_path = self.guild_path("/channels");
        self.send(
            self.request(Method::POST, &channels_path)
                .json(&json!({ "name": channel, "type": 0 })),
            || PlatformError::Transport("Unknown guild".to_string()),
        )
        .await?;

        Ok(())
    }

    async fn deprovision_team_space(&self, role: &str, channel: &str) -> Result<(), PlatformError> {
        let role_id = self.role_id(role).await?;
        let role_path = self.guild_path(&format!("/roles/{}", role_id));
        self.send(self.request(Method::DELETE, &role_path), || {
            PlatformError::RoleNotFound(role.to_string())
        })
        .await?;

        let channel_id = self
            .list_named("/channels")
            .await?
            .into_iter()
            .find(|c| c.name == channel)
            .map(|c| c.id);

        // A channel removed by hand is already deprovisioned
        if let Some(channel_id) = channel_id {
            let path = format!("/channels/{}", channel_id);
            self.send(self.request(Method::DELETE, &path), || {
                PlatformError::Transport(format!("Unknown channel '{}'", channel))
            })
            .await?;
        }

        Ok(())
    }
}
