//! Sync orchestrator: moving an exercise between GitLab and the local disk.
//!
//! [`down`] clones or updates a checkout, [`up`] commits and pushes it and
//! [`prune`] removes it once everything is safely on the server.

pub mod down;
pub mod prune;
pub mod up;

use std::path::{Path, PathBuf};

pub use down::down;
pub use prune::{prune, PruneOutcome};
pub use up::up;

use crate::config::Config;
use crate::error::FranklinError;
use crate::runner::{Check, CommandRunner};

/// Outcome of a download or upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncResult {
    /// Local or remote content changed.
    pub updated: bool,
    /// The operation stopped on a merge conflict.
    pub conflict: bool,
}

/// A downloaded exercise, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Image the exercise runs in.
    pub image: String,
    /// Local checkout.
    pub path: PathBuf,
    /// What the download did.
    pub result: SyncResult,
}

/// Writes the per-repository git settings franklin relies on: merge rather
/// than rebase on pull, the configured merge and diff tools, and the ssh key
/// when one is configured.
///
/// # Errors
///
/// Returns an error if `git config` fails.
pub fn configure_local_repo(
    runner: &CommandRunner<'_>,
    path: &Path,
    config: &Config,
) -> Result<(), FranklinError> {
    let tool = &config.merge_tool;
    let settings = [
        ("pull.rebase".to_string(), "false".to_string()),
        ("merge.tool".to_string(), tool.clone()),
        (format!("mergetool.{tool}.cmd"), config.merge_tool_cmd.clone()),
        ("mergetool.keepBackup".to_string(), "false".to_string()),
        ("diff.tool".to_string(), tool.clone()),
        (format!("difftool.{tool}.cmd"), config.diff_tool_cmd.clone()),
    ];
    let ssh = config.git_ssh_command().map(|cmd| ("core.sshCommand".to_string(), cmd));
    for (key, value) in settings.iter().chain(ssh.as_ref()) {
        let args = format!("config {key} {}", runner.quote_arg(value));
        runner.git(path, &args, Check::ExitCode)?;
    }
    Ok(())
}
