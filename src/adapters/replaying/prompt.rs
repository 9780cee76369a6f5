//! Replaying adapter for the `Prompter` port.

use super::{replay_result, SharedReplayer};
use crate::ports::prompt::Prompter;

type PromptResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Replays recorded answers; the question texts are not compared.
pub struct ReplayingPrompter {
    replayer: SharedReplayer,
}

impl ReplayingPrompter {
    /// Creates a new replaying prompter from a shared replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl Prompter for ReplayingPrompter {
    fn confirm(&self, _message: &str, _default: bool) -> PromptResult<bool> {
        replay_result::<_, ()>(&self.replayer, "prompt", "confirm", None)
    }

    fn input(&self, _message: &str, _default: &str) -> PromptResult<String> {
        replay_result::<_, ()>(&self.replayer, "prompt", "input", None)
    }

    fn select(&self, _message: &str, _options: &[String]) -> PromptResult<usize> {
        replay_result::<_, ()>(&self.replayer, "prompt", "select", None)
    }

    fn pause(&self, _message: &str) -> PromptResult<()> {
        replay_result::<_, ()>(&self.replayer, "prompt", "pause", None)
    }
}
