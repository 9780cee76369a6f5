//! `franklin status` command.

use std::path::Path;

use crate::context::ServiceContext;
use crate::error::FranklinError;
use crate::repo::{self, LocalRepository, RepoState};

/// Execute the `status` command.
///
/// Prints the classified state of the checkout and any conflicted files.
///
/// # Errors
///
/// Returns [`FranklinError::PathMissing`] for a missing path and git errors.
pub fn run(ctx: &ServiceContext, path: &Path) -> Result<(), FranklinError> {
    let runner = ctx.runner();
    let local = LocalRepository::inspect(&runner, path)?;
    if !local.exists {
        return Err(FranklinError::PathMissing(path.to_path_buf()));
    }

    println!("{}: {}", path.display(), local.state);
    match local.state {
        RepoState::Conflicted => {
            for file in repo::conflicted_files(&runner, path)? {
                println!("  conflict: {file}");
            }
            println!("Run `franklin resolve` to fix the conflicts.");
        }
        RepoState::MergeInProgress => {
            println!("Conflicts are resolved; run `franklin upload` to finish the merge.");
        }
        _ => {}
    }
    Ok(())
}
