//! Error taxonomy shared by every franklin operation.

use std::io;
use std::path::PathBuf;

/// Errors surfaced by franklin commands.
///
/// Most variants wrap the output of an external tool: the policy is to print
/// what the tool said and stop, not to retry.
#[derive(Debug, thiserror::Error)]
pub enum FranklinError {
    /// An external command exited with a non-zero status.
    #[error("command failed with exit code {exit_code}: {command}\n{output}")]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// Exit status reported by the process.
        exit_code: i32,
        /// Combined stdout and stderr.
        output: String,
    },

    /// An external command could not be started at all.
    #[error("could not run `{command}`: {message}")]
    Spawn {
        /// The command line that was attempted.
        command: String,
        /// Error reported by the shell adapter.
        message: String,
    },

    /// The repository has unresolved merge conflicts.
    #[error(
        "merge conflict in {}; resolve it with `franklin resolve` and upload again",
        path.display()
    )]
    MergeConflict {
        /// Repository containing the conflict.
        path: PathBuf,
    },

    /// Conflicts are resolved but the merge commit has not been made.
    #[error(
        "{} has an unfinished merge; run `franklin upload` to conclude it",
        .0.display()
    )]
    MergeUnfinished(PathBuf),

    /// The path exists but is not a git repository.
    #[error("{} is not a git repository", .0.display())]
    NotARepo(PathBuf),

    /// The path does not exist.
    #[error("{} does not exist", .0.display())]
    PathMissing(PathBuf),

    /// Removal was refused because tracked changes are not committed.
    #[error("{} has uncommitted changes; it was not removed", .0.display())]
    DirtyTreeRefusesRemoval(PathBuf),

    /// The user declined to continue.
    #[error("aborted")]
    Aborted,

    /// The GitLab host could not be reached over ssh.
    #[error("cannot reach {host}; check your internet connection\n{detail}")]
    NoConnectivity {
        /// Host that was probed.
        host: String,
        /// Output of the probe.
        detail: String,
    },

    /// Not enough free disk space to run an exercise.
    #[error(
        "only {available_gb:.1} GB free disk space, at least {required_gb} GB is required"
    )]
    InsufficientDisk {
        /// Free space found, in GB.
        available_gb: f64,
        /// Configured minimum, in GB.
        required_gb: u64,
    },

    /// The container runtime did not come up.
    #[error("container runtime is not running: {0}")]
    RuntimeUnavailable(String),

    /// A required tool or setting is missing from the local environment.
    #[error("{0}")]
    Environment(String),

    /// The exercise registry could not answer.
    #[error("exercise registry: {0}")]
    Registry(String),

    /// Reading an answer from the user failed.
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// A course or exercise name is not acceptable.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The configuration file or environment could not be read.
    #[error("configuration: {0}")]
    Config(String),

    /// An interrupt arrived during a guarded region and is being delivered now.
    #[error("interrupted")]
    Interrupted,

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Command-line usage error, already formatted by the parser.
    #[error("{0}")]
    Usage(String),
}

impl FranklinError {
    /// Process exit status for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => 2,
            Self::Interrupted => 130,
            _ => 1,
        }
    }

    /// Wraps a failed prompt-port call.
    pub fn prompt(err: impl std::fmt::Display) -> Self {
        Self::Prompt(err.to_string())
    }

    /// Wraps a failed registry-port call.
    pub fn registry(err: impl std::fmt::Display) -> Self {
        Self::Registry(err.to_string())
    }
}
