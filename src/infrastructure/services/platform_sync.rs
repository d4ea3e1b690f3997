//! Best-effort platform calls made after a commit

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::config::ChannelSettings;
use crate::domain::platform::{PlatformDirectory, PlatformError, SyncStep, SyncWarning};
use crate::domain::player::PlayerId;

/// Runs platform calls under a timeout and turns failures into warnings
#[derive(Clone)]
pub struct PlatformSync {
    directory: Arc<dyn PlatformDirectory>,
    timeout: Duration,
    channels: ChannelSettings,
}

impl std::fmt::Debug for PlatformSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformSync")
            .field("timeout", &self.timeout)
            .field("channels", &self.channels)
            .finish()
    }
}

impl PlatformSync {
    pub fn new(
        directory: Arc<dyn PlatformDirectory>,
        timeout: Duration,
        channels: ChannelSettings,
    ) -> Self {
        Self {
            directory,
            timeout,
            channels,
        }
    }

    pub fn directory(&self) -> &dyn PlatformDirectory {
        self.directory.as_ref()
    }

    /// Awaits `call` for at most the configured timeout
    pub async fn attempt<F>(&self, step: SyncStep, call: F) -> Option<SyncWarning>
    where
        F: Future<Output = Result<(), PlatformError>>,
    {
        let error = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(())) => return None,
            Ok(Err(e)) => e,
            Err(_) => PlatformError::Timeout(self.timeout),
        };

        warn!(step = ?step, error = %error, "Platform out of sync with roster");
        Some(SyncWarning::new(step, &error))
    }

    pub async fn notify_player(&self, user: &PlayerId, content: &str) -> Option<SyncWarning> {
        self.attempt(
            SyncStep::Notify,
            self.directory.send_direct_message(user, content),
        )
        .await
    }

    /// Posts to the moderation channel
    ///
    /// A missing channel is reported as a warning, since moderators then
    /// never hear about work that waits on them.
    pub async fn notify_moderators(&self, content: &str) -> Option<SyncWarning> {
        let Some(channel) = self.channels.moderation.as_deref() else {
            warn!("Moderators not notified: no moderation channel configured");
            return Some(SyncWarning {
                step: SyncStep::Notify,
                message: "no moderation channel is configured".to_string(),
            });
        };

        self.attempt(
            SyncStep::Notify,
            self.directory.send_channel_message(channel, content),
        )
        .await
    }

    /// Posts to the announcement channel, if one is configured
    pub async fn announce(&self, content: &str) -> Option<SyncWarning> {
        let channel = self.channels.announcements.as_deref()?;

        self.attempt(
            SyncStep::Notify,
            self.directory.send_channel_message(channel, content),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::platform::MockPlatformDirectory;

    fn channels() -> ChannelSettings {
        ChannelSettings {
            moderation: Some("mod-queue".to_string()),
            announcements: None,
        }
    }

    #[tokio::test]
    async fn test_failure_becomes_warning() {
        let mut directory = MockPlatformDirectory::new();
        directory
            .expect_send_channel_message()
            .returning(|_, _| Err(PlatformError::PermissionDenied("Send Messages".to_string())));

        let sync = PlatformSync::new(Arc::new(directory), Duration::from_secs(1), channels());
        let warning = sync.notify_moderators("new invite").await.unwrap();

        assert_eq!(warning.step, SyncStep::Notify);
        assert!(warning.message.contains("Send Messages"));
    }

    #[tokio::test]
    async fn test_unconfigured_channel_is_skipped() {
        let directory = MockPlatformDirectory::new();
        let sync = PlatformSync::new(Arc::new(directory), Duration::from_secs(1), channels());

        assert!(sync.announce("Blue Otters was founded").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_moderation_channel_is_a_warning() {
        let directory = MockPlatformDirectory::new();
        let sync = PlatformSync::new(
            Arc::new(directory),
            Duration::from_secs(1),
            ChannelSettings::default(),
        );

        let warning = sync.notify_moderators("new invite").await.unwrap();
        assert_eq!(warning.step, SyncStep::Notify);
        assert!(warning.message.contains("moderation channel"));
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let directory = MockPlatformDirectory::new();
        let sync = PlatformSync::new(Arc::new(directory), Duration::from_millis(20), channels());

        let warning = sync
            .attempt(SyncStep::GrantRole, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(warning.step, SyncStep::GrantRole);
        assert!(warning.message.contains("timed out"));
    }
}
