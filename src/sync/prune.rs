//! Removal of a checkout after upload.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::FranklinError;
use crate::logging::LOG_FILE;
use crate::repo::{self, RepoState};
use crate::runner::CommandRunner;

/// What [`prune`] removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PruneOutcome {
    /// The whole checkout is gone.
    Removed,
    /// Tracked files and `.git` are gone; untracked files were kept.
    KeptUntracked {
        /// Number of untracked files left in place.
        kept: usize,
    },
}

/// Removes the checkout at `path` if nothing would be lost.
///
/// A clean checkout is deleted wholesale. If only untracked files remain,
/// the tracked files, the directories they leave empty and `.git` are
/// deleted, and the untracked files stay. `franklin.log` does not count as
/// an untracked file and is deleted along with the checkout. When the
/// process is running inside the checkout it first moves to the parent
/// directory.
///
/// # Errors
///
/// Returns [`FranklinError::DirtyTreeRefusesRemoval`] without deleting
/// anything when a merge is in progress or tracked changes are not
/// committed, and [`FranklinError::NotARepo`] if `path` is not a checkout.
pub fn prune(runner: &CommandRunner<'_>, path: &Path) -> Result<PruneOutcome, FranklinError> {
    if !path.join(".git").exists() {
        return Err(FranklinError::NotARepo(path.to_path_buf()));
    }
    let root = path.canonicalize()?;

    let mut entries = repo::status_entries(runner, path)?;
    entries.retain(|e| e.path != LOG_FILE);
    let merge_in_progress = root.join(".git").join("MERGE_HEAD").exists();
    match repo::classify_entries(&entries, merge_in_progress) {
        RepoState::Clean => {
            step_out_of(&root)?;
            fs::remove_dir_all(&root)?;
            info!(path = %root.display(), "removed checkout");
            Ok(PruneOutcome::Removed)
        }
        RepoState::UntrackedOnly => {
            let tracked = repo::tracked_files(runner, path)?;
            remove_log(&root);
            remove_tracked(&root, &tracked)?;
            fs::remove_dir_all(root.join(".git"))?;
            info!(path = %root.display(), kept = entries.len(), "removed tracked files");
            Ok(PruneOutcome::KeptUntracked { kept: entries.len() })
        }
        state => {
            warn!(path = %path.display(), %state, "refusing to remove checkout");
            Err(FranklinError::DirtyTreeRefusesRemoval(path.to_path_buf()))
        }
    }
}

/// Moves the process to the parent of `root` if the working directory is
/// `root` or lies below it.
fn step_out_of(root: &Path) -> io::Result<()> {
    let cwd = env::current_dir()?.canonicalize()?;
    if !cwd.starts_with(root) {
        return Ok(());
    }
    let parent = root.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "refusing to remove the filesystem root")
    })?;
    debug!(dir = %parent.display(), "leaving checkout before removal");
    env::set_current_dir(parent)
}

fn remove_log(root: &Path) {
    let log = root.join(LOG_FILE);
    match fs::remove_file(&log) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %log.display(), "could not remove log file: {e}"),
    }
}

/// Deletes `files` under `root`, then every directory that held one of them
/// and is now empty, deepest first. `root` itself is never removed.
fn remove_tracked(root: &Path, files: &[PathBuf]) -> io::Result<()> {
    let mut dirs = BTreeSet::new();
    for file in files {
        match fs::remove_file(root.join(file)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        let mut parent = file.parent();
        while let Some(dir) = parent.filter(|d| !d.as_os_str().is_empty()) {
            dirs.insert(dir.to_path_buf());
            parent = dir.parent();
        }
    }

    let mut dirs: Vec<PathBuf> = dirs.into_iter().collect();
    dirs.sort_by_key(|d| Reverse(d.components().count()));
    for dir in dirs {
        let full = root.join(&dir);
        if fs::read_dir(&full).is_ok_and(|mut entries| entries.next().is_none()) {
            fs::remove_dir(&full)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::script::Script;
    use crate::sync::testing::{fake_checkout, STATUS};

    #[test]
    fn clean_checkout_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_checkout(dir.path(), "week1", &[("notebook.ipynb", "{}")]);
        let ctx = Script::new().git(&path, STATUS, 0, "").context();

        assert_eq!(prune(&ctx.runner(), &path).unwrap(), PruneOutcome::Removed);
        assert!(!path.exists());
    }

    #[test]
    fn log_file_does_not_block_removal() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_checkout(dir.path(), "week1", &[(LOG_FILE, "DEBUG ...")]);
        let ctx = Script::new().git(&path, STATUS, 0, "?? franklin.log\0").context();

        assert_eq!(prune(&ctx.runner(), &path).unwrap(), PruneOutcome::Removed);
        assert!(!path.exists());
    }

    #[test]
    fn log_file_is_removed_with_tracked_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_checkout(
            dir.path(),
            "week1",
            &[("README.md", "# week1"), ("mine.py", "x = 1"), (LOG_FILE, "DEBUG ...")],
        );
        let ctx = Script::new()
            .git(&path, STATUS, 0, "?? franklin.log\0?? mine.py\0")
            .git(&path, "ls-files -z", 0, "README.md\0")
            .context();

        let outcome = prune(&ctx.runner(), &path).unwrap();
        assert_eq!(outcome, PruneOutcome::KeptUntracked { kept: 1 });
        assert!(path.join("mine.py").exists());
        assert!(!path.join(LOG_FILE).exists());
    }

    #[test]
    fn untracked_files_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_checkout(
            dir.path(),
            "week1",
            &[
                ("README.md", "# week1"),
                ("data/input.csv", "a,b"),
                ("data/raw/seq.fa", ">x"),
                ("results/plot.png", "png"),
                ("my notes.txt", "remember"),
                ("data/mine.csv", "c,d"),
            ],
        );
        let ctx = Script::new()
            .git(&path, STATUS, 0, "?? my notes.txt\0?? data/mine.csv\0?? results/plot.png\0")
            .git(&path, "ls-files -z", 0, "README.md\0data/input.csv\0data/raw/seq.fa\0")
            .context();

        let outcome = prune(&ctx.runner(), &path).unwrap();
        assert_eq!(outcome, PruneOutcome::KeptUntracked { kept: 3 });
        assert!(path.join("my notes.txt").exists());
        assert!(path.join("data/mine.csv").exists());
        assert!(path.join("results/plot.png").exists());
        assert!(!path.join("README.md").exists());
        assert!(!path.join("data/input.csv").exists());
        assert!(!path.join("data/raw").exists());
        assert!(path.join("data").exists());
        assert!(!path.join(".git").exists());
    }

    #[test]
    fn dirty_tree_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path =
            fake_checkout(dir.path(), "week1", &[("analysis.py", "x = 2"), (LOG_FILE, "DEBUG ...")]);
        let ctx = Script::new()
            .git(&path, STATUS, 0, " M analysis.py\0?? franklin.log\0")
            .context();

        let err = prune(&ctx.runner(), &path).unwrap_err();
        assert!(matches!(err, FranklinError::DirtyTreeRefusesRemoval(_)));
        assert!(path.join("analysis.py").exists());
        assert!(path.join(LOG_FILE).exists());
        assert!(path.join(".git").exists());
    }

    #[test]
    fn merge_in_progress_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_checkout(dir.path(), "week1", &[(".git/MERGE_HEAD", "abc")]);
        let ctx = Script::new().git(&path, STATUS, 0, "").context();

        assert!(prune(&ctx.runner(), &path).is_err());
        assert!(path.exists());
    }

    #[test]
    fn conflicted_tree_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_checkout(dir.path(), "week1", &[("a.py", "<<<<<<<")]);
        let ctx = Script::new().git(&path, STATUS, 0, "UU a.py\0").context();

        assert!(prune(&ctx.runner(), &path).is_err());
        assert!(path.join("a.py").exists());
    }
}
