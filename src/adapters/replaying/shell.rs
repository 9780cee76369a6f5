//! Replaying adapter for the `ShellExecutor` port.

use super::{replay_result, SharedReplayer};
use crate::adapters::recording::shell::CommandInput;
use crate::ports::shell::{ShellExecutor, ShellOutput};

/// Replays recorded shell command results from a cassette.
///
/// Commands must be requested exactly as they were recorded.
pub struct ReplayingShellExecutor {
    replayer: SharedReplayer,
}

impl ReplayingShellExecutor {
    /// Creates a new replaying shell executor from a shared replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl ShellExecutor for ReplayingShellExecutor {
    fn run(&self, command: &str) -> Result<ShellOutput, Box<dyn std::error::Error + Send + Sync>> {
        replay_result(&self.replayer, "shell", "run", Some(&CommandInput { command }))
    }

    fn run_interactive(
        &self,
        command: &str,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        replay_result(&self.replayer, "shell", "run_interactive", Some(&CommandInput { command }))
    }
}
