//! Repository state checker.
//!
//! The state of a local checkout is read from `git status --porcelain=v1 -z`
//! and the `MERGE_HEAD` marker, never from human-readable git output.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FranklinError;
use crate::runner::{Check, CommandRunner};

const STATUS_ARGS: &str = "status --porcelain=v1 -z --untracked-files=all";
const UNMERGED_CODES: [&str; 7] = ["DD", "AU", "UD", "UA", "DU", "AA", "UU"];

/// Classification of a local path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoState {
    /// Missing, or not a git working tree.
    NotAGitRepo,
    /// A merge was started and its conflicts are resolved but not committed.
    MergeInProgress,
    /// Nothing to commit, nothing untracked.
    Clean,
    /// Only untracked files besides committed content.
    UntrackedOnly,
    /// Unresolved merge conflicts.
    Conflicted,
    /// Tracked files are modified, staged, deleted or renamed.
    OtherDirty,
}

impl fmt::Display for RepoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotAGitRepo => "not a git repository",
            Self::MergeInProgress => "merge in progress",
            Self::Clean => "clean",
            Self::UntrackedOnly => "untracked files only",
            Self::Conflicted => "merge conflicts",
            Self::OtherDirty => "uncommitted changes",
        };
        f.write_str(text)
    }
}

/// One entry of porcelain status output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// The two-letter `XY` code.
    pub code: String,
    /// Path relative to the repository root.
    pub path: String,
}

impl StatusEntry {
    /// `??`
    #[must_use]
    pub fn is_untracked(&self) -> bool {
        self.code == "??"
    }

    /// Unmerged path left by a conflicting merge.
    #[must_use]
    pub fn is_unmerged(&self) -> bool {
        UNMERGED_CODES.contains(&self.code.as_str())
    }
}

/// Parses `git status --porcelain=v1 -z` output.
///
/// Renames and copies carry their source path as an extra NUL-separated
/// field, which is skipped.
#[must_use]
pub fn parse_porcelain(output: &str) -> Vec<StatusEntry> {
    let mut entries = Vec::new();
    let mut fields = output.split('\0').filter(|f| !f.is_empty());
    while let Some(field) = fields.next() {
        let Some((code, path)) = field.get(..2).zip(field.get(3..)) else {
            continue;
        };
        if code.starts_with(['R', 'C']) {
            fields.next();
        }
        entries.push(StatusEntry { code: code.to_string(), path: path.to_string() });
    }
    entries
}

/// Classifies a git working tree from its status entries.
#[must_use]
pub fn classify_entries(entries: &[StatusEntry], merge_in_progress: bool) -> RepoState {
    if entries.iter().any(StatusEntry::is_unmerged) {
        RepoState::Conflicted
    } else if merge_in_progress {
        RepoState::MergeInProgress
    } else if entries.is_empty() {
        RepoState::Clean
    } else if entries.iter().all(StatusEntry::is_untracked) {
        RepoState::UntrackedOnly
    } else {
        RepoState::OtherDirty
    }
}

/// What is known about a local checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepository {
    /// Checkout directory.
    pub path: PathBuf,
    /// The path exists.
    pub exists: bool,
    /// The path holds a `.git` entry.
    pub is_git: bool,
    /// `.git/MERGE_HEAD` exists.
    pub merge_in_progress: bool,
    /// Classified working-tree state.
    pub state: RepoState,
}

impl LocalRepository {
    /// Inspects `path`. No process is spawned unless it is a repository.
    ///
    /// # Errors
    ///
    /// Returns an error if `git status` fails.
    pub fn inspect(runner: &CommandRunner<'_>, path: &Path) -> Result<Self, FranklinError> {
        let exists = path.exists();
        let is_git = path.join(".git").exists();
        let merge_in_progress = path.join(".git").join("MERGE_HEAD").exists();
        let state = if is_git {
            classify_entries(&status_entries(runner, path)?, merge_in_progress)
        } else {
            RepoState::NotAGitRepo
        };
        debug!(path = %path.display(), %state, "inspected repository");
        Ok(Self { path: path.to_path_buf(), exists, is_git, merge_in_progress, state })
    }
}

/// Classifies `path`.
///
/// # Errors
///
/// Returns an error if `git status` fails.
pub fn classify(runner: &CommandRunner<'_>, path: &Path) -> Result<RepoState, FranklinError> {
    Ok(LocalRepository::inspect(runner, path)?.state)
}

/// Porcelain status entries of the working tree at `path`.
///
/// # Errors
///
/// Returns an error if `git status` fails.
pub fn status_entries(
    runner: &CommandRunner<'_>,
    path: &Path,
) -> Result<Vec<StatusEntry>, FranklinError> {
    let output = runner.git(path, STATUS_ARGS, Check::ExitCode)?;
    Ok(parse_porcelain(&output.stdout))
}

/// Paths with unresolved conflicts.
///
/// # Errors
///
/// Returns an error if `git status` fails.
pub fn conflicted_files(
    runner: &CommandRunner<'_>,
    path: &Path,
) -> Result<Vec<String>, FranklinError> {
    Ok(status_entries(runner, path)?
        .into_iter()
        .filter(StatusEntry::is_unmerged)
        .map(|e| e.path)
        .collect())
}

/// Whether the index differs from `HEAD`.
///
/// # Errors
///
/// Returns [`FranklinError::CommandFailed`] if git reports anything other
/// than "differences" or "no differences".
pub fn has_staged_changes(runner: &CommandRunner<'_>, path: &Path) -> Result<bool, FranklinError> {
    let args = "diff --cached --quiet";
    let output = runner.git(path, args, Check::Ignore)?;
    match output.exit_code {
        0 => Ok(false),
        1 => Ok(true),
        exit_code => Err(FranklinError::CommandFailed {
            command: format!("git {args}"),
            exit_code,
            output: output.combined(),
        }),
    }
}

/// Files git tracks, relative to the repository root.
///
/// # Errors
///
/// Returns an error if `git ls-files` fails.
pub fn tracked_files(runner: &CommandRunner<'_>, path: &Path) -> Result<Vec<PathBuf>, FranklinError> {
    let output = runner.git(path, "ls-files -z", Check::ExitCode)?;
    Ok(output.stdout.split('\0').filter(|f| !f.is_empty()).map(PathBuf::from).collect())
}

/// The commit `HEAD` points at, or `None` before the first commit.
///
/// # Errors
///
/// Returns an error if git cannot be started.
pub fn head(runner: &CommandRunner<'_>, path: &Path) -> Result<Option<String>, FranklinError> {
    let output = runner.git(path, "rev-parse HEAD", Check::Ignore)?;
    Ok(output.success().then(|| output.stdout.trim().to_string()))
}

/// Number of local commits not yet on the upstream branch.
///
/// Without an upstream the count is zero.
///
/// # Errors
///
/// Returns an error if git cannot be started.
pub fn unpushed_commits(runner: &CommandRunner<'_>, path: &Path) -> Result<usize, FranklinError> {
    let output = runner.git(path, "rev-list --count @{u}..HEAD", Check::Ignore)?;
    if !output.success() {
        return Ok(0);
    }
    Ok(output.stdout.trim().parse().unwrap_or(0))
}
