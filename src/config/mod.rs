//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, ChannelSettings, LogFormat, LoggingConfig, ModerationSettings, PlatformBackend,
    PlatformSettings, RosterSettings, ServerConfig, StorageBackend, StorageSettings,
};
