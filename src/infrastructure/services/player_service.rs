//! Player registry

use std::sync::Arc;

use tracing::info;

use crate::domain::player::{LaneRole, Player, PlayerId, PlayerRepository};
use crate::domain::{ConflictKind, DomainError};

/// Profile fields a player may change; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub nickname: Option<String>,
    pub lane: Option<LaneRole>,
    pub bio: Option<String>,
}

/// Registration and profile management
#[derive(Debug, Clone)]
pub struct PlayerService {
    players: Arc<dyn PlayerRepository>,
}

impl PlayerService {
    pub fn new(players: Arc<dyn PlayerRepository>) -> Self {
        Self { players }
    }

    /// Parse a raw platform handle
    pub fn parse_handle(handle: &str) -> Result<PlayerId, DomainError> {
        PlayerId::new(handle.trim()).map_err(|e| DomainError::validation(e.to_string()))
    }

    /// Register a platform user as a free agent
    pub async fn register(
        &self,
        id: PlayerId,
        nickname: &str,
        lane: LaneRole,
    ) -> Result<Player, DomainError> {
        let player = Player::new(id, nickname.trim(), lane)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        // The repository rejects duplicates as well; this gives the nicer message
        if self.players.exists(player.id()).await? {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyRegistered,
                format!("Player '{}' is already registered", player.id()),
            ));
        }

        let player = self.players.create(player).await?;
        info!(player_id = %player.id(), lane = %player.lane(), "Player registered");
        Ok(player)
    }

    pub async fn get(&self, id: &PlayerId) -> Result<Option<Player>, DomainError> {
        self.players.get(id).await
    }

    /// Get a registered player, returning an error if not found
    pub async fn require(&self, id: &PlayerId) -> Result<Player, DomainError> {
        self.players
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Player '{}' is not registered", id)))
    }

    pub async fn exists(&self, id: &PlayerId) -> Result<bool, DomainError> {
        self.players.exists(id).await
    }

    pub async fn update_profile(
        &self,
        id: &PlayerId,
        request: UpdateProfileRequest,
    ) -> Result<Player, DomainError> {
        let mut player = self.require(id).await?;

        if let Some(nickname) = request.nickname {
            player
                .set_nickname(nickname.trim())
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        if let Some(lane) = request.lane {
            player.set_lane(lane);
        }

        if let Some(bio) = request.bio {
            let bio = bio.trim();
            let bio = (!bio.is_empty()).then(|| bio.to_string());
            player
                .set_bio(bio)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        let player = self.players.update_profile(&player).await?;
        info!(player_id = %player.id(), "Player profile updated");
        Ok(player)
    }

    pub async fn set_premium(&self, id: &PlayerId, premium: bool) -> Result<Player, DomainError> {
        let mut player = self.require(id).await?;
        player.set_premium(premium);

        let player = self.players.update_profile(&player).await?;
        info!(player_id = %player.id(), premium, "Player premium flag changed");
        Ok(player)
    }

    /// Registered players without a team, oldest registration first
    pub async fn list_free_agents(&self) -> Result<Vec<Player>, DomainError> {
        self.players.list_free_agents().await
    }
}
