//! `franklin resolve` command.

use std::path::Path;

use crate::context::ServiceContext;
use crate::error::FranklinError;
use crate::merge_tool::launch_merge_tool;
use crate::repo::{self, RepoState};

/// Execute the `resolve` command.
///
/// Launches the merge tool when the checkout has conflicts.
///
/// # Errors
///
/// Returns [`FranklinError::NotARepo`] outside a checkout and
/// [`FranklinError::MergeConflict`] if conflicts remain afterwards.
pub fn run(ctx: &ServiceContext, path: &Path) -> Result<(), FranklinError> {
    let runner = ctx.runner();
    match repo::classify(&runner, path)? {
        RepoState::NotAGitRepo => Err(FranklinError::NotARepo(path.to_path_buf())),
        RepoState::Conflicted => {
            launch_merge_tool(&runner, path)?;
            if repo::classify(&runner, path)? == RepoState::Conflicted {
                return Err(FranklinError::MergeConflict { path: path.to_path_buf() });
            }
            println!("Conflicts resolved. Run `franklin upload` to finish the merge.");
            Ok(())
        }
        RepoState::MergeInProgress => {
            println!("No conflicts left in {}. Run `franklin upload` to finish the merge.", path.display());
            Ok(())
        }
        _ => {
            println!("No merge conflicts in {}.", path.display());
            Ok(())
        }
    }
}
