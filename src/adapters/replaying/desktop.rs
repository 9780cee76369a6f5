//! Replaying adapter for the `Desktop` port.

use super::{replay_result, SharedReplayer};
use crate::adapters::recording::desktop::UrlInput;
use crate::ports::desktop::Desktop;

/// Replays browser and clipboard results; opened URLs must match the recording.
pub struct ReplayingDesktop {
    replayer: SharedReplayer,
}

impl ReplayingDesktop {
    /// Creates a new replaying desktop from a shared replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl Desktop for ReplayingDesktop {
    fn open_url(&self, url: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        replay_result(&self.replayer, "desktop", "open_url", Some(&UrlInput { url }))
    }

    fn copy_to_clipboard(
        &self,
        _text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        replay_result::<_, ()>(&self.replayer, "desktop", "copy_to_clipboard", None)
    }
}
