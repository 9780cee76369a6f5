//! Upload: commit tracked changes and push them.

use std::path::Path;

use tracing::{info, warn};

use super::prune::{prune, PruneOutcome};
use super::SyncResult;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::FranklinError;
use crate::merge_tool::launch_merge_tool;
use crate::repo::{self, RepoState};
use crate::runner::{Check, CommandRunner};

/// Uploads the checkout at `path`.
///
/// Only files git already tracks are committed; new files are never added.
/// With nothing staged and nothing unpushed, no commit or push is made.
/// With `remove_after`, the checkout is pruned afterwards; a refusal to
/// prune is reported and does not fail the upload.
///
/// # Errors
///
/// Returns [`FranklinError::PathMissing`] or [`FranklinError::NotARepo`]
/// for a bad path, [`FranklinError::MergeConflict`] if conflicts remain
/// after the merge tool or the pull before pushing conflicts, and command
/// errors otherwise.
pub fn up(
    ctx: &ServiceContext,
    config: &Config,
    path: &Path,
    remove_after: bool,
) -> Result<SyncResult, FranklinError> {
    if !path.exists() {
        return Err(FranklinError::PathMissing(path.to_path_buf()));
    }
    if !path.join(".git").exists() {
        return Err(FranklinError::NotARepo(path.to_path_buf()));
    }
    let runner = ctx.runner();

    runner.git(path, "fetch", Check::ExitCode)?;
    let merged = finish_merge(&runner, path)?;

    runner.git(path, "add -u", Check::ExitCode)?;
    let staged = repo::has_staged_changes(&runner, path)?;
    if staged {
        let message = ctx
            .prompt
            .input("Commit message", &config.default_commit_message)
            .map_err(FranklinError::prompt)?;
        runner.git(path, &format!("commit -m {}", runner.quote_arg(&message)), Check::ExitCode)?;
    }

    let updated = staged || merged || repo::unpushed_commits(&runner, path)? > 0;
    if updated {
        pull_then_push(&runner, path)?;
        println!("Uploaded {}.", path.display());
    } else {
        println!("No changes to upload.");
    }

    if remove_after {
        let shown = path.canonicalize()?;
        match prune(&runner, path) {
            Ok(PruneOutcome::Removed) => println!("Removed {}.", shown.display()),
            Ok(PruneOutcome::KeptUntracked { kept }) => println!(
                "Removed the exercise files from {}; {kept} file(s) you created were kept.",
                shown.display()
            ),
            Err(FranklinError::DirtyTreeRefusesRemoval(p)) => {
                warn!(path = %p.display(), "checkout kept after upload");
                println!("{} still has changes that are not uploaded; it was not removed.", p.display());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(SyncResult { updated, conflict: false })
}

/// Concludes a merge left by an earlier pull. Returns whether a merge
/// commit was made.
fn finish_merge(runner: &CommandRunner<'_>, path: &Path) -> Result<bool, FranklinError> {
    let mut state = repo::classify(runner, path)?;
    if state == RepoState::Conflicted {
        launch_merge_tool(runner, path)?;
        state = repo::classify(runner, path)?;
        if state == RepoState::Conflicted {
            return Err(FranklinError::MergeConflict { path: path.to_path_buf() });
        }
    }
    if state == RepoState::MergeInProgress {
        info!(path = %path.display(), "concluding merge");
        runner.git(path, "commit --no-edit", Check::ExitCode)?;
        return Ok(true);
    }
    Ok(false)
}

fn pull_then_push(runner: &CommandRunner<'_>, path: &Path) -> Result<(), FranklinError> {
    let args = "pull --no-rebase";
    let pull = runner.git(path, args, Check::Ignore)?;
    if !pull.success() {
        if repo::classify(runner, path)? == RepoState::Conflicted {
            println!("{}", pull.combined());
            return Err(FranklinError::MergeConflict { path: path.to_path_buf() });
        }
        return Err(FranklinError::CommandFailed {
            command: format!("git {args}"),
            exit_code: pull.exit_code,
            output: pull.combined(),
        });
    }
    runner.git(path, "push", Check::ExitCode)?;
    Ok(())
}
