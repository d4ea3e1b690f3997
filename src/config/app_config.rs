use serde::Deserialize;

use crate::domain::team::TAG_STORAGE_LIMIT;

/// Longest invite lifetime accepted from configuration
const MAX_INVITE_VALIDITY_DAYS: i64 = 365;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub roster: RosterSettings,
    #[serde(default)]
    pub platform: PlatformSettings,
    #[serde(default)]
    pub channels: ChannelSettings,
    #[serde(default)]
    pub moderation: ModerationSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Membership rules
#[derive(Debug, Clone, Deserialize)]
pub struct RosterSettings {
    /// New invites wait for a moderator before the invitee can accept
    #[serde(default = "default_true")]
    pub approval_required: bool,
    #[serde(default = "default_tag_max_length")]
    pub tag_max_length: usize,
    #[serde(default = "default_invite_validity_days")]
    pub invite_validity_days: i64,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlatformBackend {
    #[default]
    Memory,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSettings {
    #[serde(default)]
    pub backend: PlatformBackend,
    #[serde(default = "default_platform_url")]
    pub base_url: String,
    pub guild_id: Option<String>,
    pub token: Option<String>,
    /// Upper bound for each platform call made after a commit
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Channel identifiers used for notifications
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChannelSettings {
    pub moderation: Option<String>,
    pub announcements: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ModerationSettings {
    #[serde(default)]
    pub moderator_ids: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    10
}

fn default_tag_max_length() -> usize {
    5
}

fn default_invite_validity_days() -> i64 {
    7
}

fn default_platform_url() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_request_timeout_secs() -> u64 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: default_max_connections(),
        }
    }
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            approval_required: true,
            tag_max_length: default_tag_max_length(),
            invite_validity_days: default_invite_validity_days(),
        }
    }
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            backend: PlatformBackend::default(),
            base_url: default_platform_url(),
            guild_id: None,
            token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ModerationSettings {
    pub fn is_moderator(&self, handle: &str) -> bool {
        self.moderator_ids.iter().any(|id| id == handle)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("moderation.moderator_ids")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the roster cannot run with
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let roster = &self.roster;

        if !(1..=TAG_STORAGE_LIMIT).contains(&roster.tag_max_length) {
            return Err(config::ConfigError::Message(format!(
                "roster.tag_max_length must be between 1 and {}, got {}",
                TAG_STORAGE_LIMIT, roster.tag_max_length
            )));
        }

        if !(1..=MAX_INVITE_VALIDITY_DAYS).contains(&roster.invite_validity_days) {
            return Err(config::ConfigError::Message(format!(
                "roster.invite_validity_days must be between 1 and {}, got {}",
                MAX_INVITE_VALIDITY_DAYS, roster.invite_validity_days
            )));
        }

        Ok(())
    }
}
