//! Conflict resolver launcher.

use std::path::Path;

use tracing::{error, info};

use crate::error::FranklinError;
use crate::repo;
use crate::runner::{Check, CommandRunner};

/// Lists the conflicted files and runs `git mergetool` on them, blocking
/// until the tool exits.
///
/// # Errors
///
/// Returns [`FranklinError::CommandFailed`] if the merge tool fails. The
/// failure is logged and not retried.
pub fn launch_merge_tool(runner: &CommandRunner<'_>, path: &Path) -> Result<(), FranklinError> {
    let files = repo::conflicted_files(runner, path)?;
    println!("Merge conflicts in {}:", path.display());
    for file in &files {
        println!("  {file}");
    }
    info!(path = %path.display(), files = files.len(), "launching merge tool");

    let command = format!("git -C {} mergetool", runner.quote(path));
    runner.interactive(&command, Check::ExitCode).map(|_| ()).map_err(|e| {
        error!(path = %path.display(), "merge tool failed: {e}");
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::script::{git_command, Script};

    const STATUS: &str = "status --porcelain=v1 -z --untracked-files=all";

    #[test]
    fn runs_mergetool_interactively() {
        let repo = Path::new("/w/week1");
        let ctx = Script::new()
            .git(repo, STATUS, 0, "UU analysis.ipynb\0")
            .interactive(&git_command(repo, "mergetool"), 0)
            .context();
        launch_merge_tool(&ctx.runner(), repo).unwrap();
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn tool_failure_is_surfaced() {
        let repo = Path::new("/w/week1");
        let ctx = Script::new()
            .git(repo, STATUS, 0, "AA notes.md\0")
            .interactive(&git_command(repo, "mergetool"), 1)
            .context();
        let err = launch_merge_tool(&ctx.runner(), repo).unwrap_err();
        assert!(matches!(err, FranklinError::CommandFailed { exit_code: 1, .. }));
    }
}
