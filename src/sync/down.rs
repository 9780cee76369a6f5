//! Download: clone an exercise, or update an existing checkout.

use std::path::Path;

use tracing::{info, warn};

use super::{configure_local_repo, Download, SyncResult};
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::FranklinError;
use crate::exercise::{validate_name, RemoteExercise};
use crate::repo::{self, LocalRepository, RepoState};
use crate::runner::{Check, CommandRunner};

const LOCAL_CHANGES_MESSAGE: &str = "Local changes before update";

/// Downloads `exercise` of `course` into `<work_dir>/<exercise>`.
///
/// A missing checkout is cloned without asking. An existing one is updated
/// only if the user agrees; local edits are committed first so the pull can
/// merge them. A pull that ends in conflicts returns early with
/// `conflict = true` and leaves the repository for the user to resolve.
///
/// # Errors
///
/// Returns [`FranklinError::Aborted`] if the user declines the update,
/// [`FranklinError::NotARepo`] if the path is occupied by something else,
/// [`FranklinError::MergeConflict`] or [`FranklinError::MergeUnfinished`]
/// if an earlier merge is unfinished, and
/// command or registry errors otherwise.
pub fn down(
    ctx: &ServiceContext,
    config: &Config,
    course: &str,
    exercise: &str,
) -> Result<Download, FranklinError> {
    validate_name(course)?;
    validate_name(exercise)?;
    let remote = ctx.registry.resolve(course, exercise).map_err(FranklinError::registry)?;
    let path = config.work_dir.join(exercise);
    let runner = ctx.runner();

    let result = if path.exists() {
        update(ctx, &runner, &path)?
    } else {
        clone(&runner, config, &remote, &path)?
    };
    if !result.conflict {
        configure_local_repo(&runner, &path, config)?;
    }
    Ok(Download { image: remote.image, path, result })
}

fn clone(
    runner: &CommandRunner<'_>,
    config: &Config,
    remote: &RemoteExercise,
    path: &Path,
) -> Result<SyncResult, FranklinError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    info!(url = %remote.clone_url, path = %path.display(), "cloning exercise");
    let ssh = config
        .git_ssh_command()
        .map(|cmd| {
            let setting = format!("core.sshCommand={cmd}");
            format!("--config {} ", runner.quote_arg(&setting))
        })
        .unwrap_or_default();
    let command = format!(
        "git clone {ssh}{} {}",
        runner.quote_arg(&remote.clone_url),
        runner.quote(path)
    );
    runner.run(&command, Check::ExitCode)?;
    Ok(SyncResult { updated: true, conflict: false })
}

fn update(
    ctx: &ServiceContext,
    runner: &CommandRunner<'_>,
    path: &Path,
) -> Result<SyncResult, FranklinError> {
    let local = LocalRepository::inspect(runner, path)?;
    match local.state {
        RepoState::NotAGitRepo => return Err(FranklinError::NotARepo(path.to_path_buf())),
        RepoState::Conflicted => {
            return Err(FranklinError::MergeConflict { path: path.to_path_buf() })
        }
        RepoState::MergeInProgress => {
            return Err(FranklinError::MergeUnfinished(path.to_path_buf()))
        }
        _ => {}
    }

    let question =
        format!("{} already exists. Update it with changes from GitLab?", path.display());
    if !ctx.prompt.confirm(&question, true).map_err(FranklinError::prompt)? {
        info!(path = %path.display(), "update declined");
        return Err(FranklinError::Aborted);
    }

    let before = repo::head(runner, path)?;
    if local.state == RepoState::OtherDirty {
        commit_local_changes(runner, path)?;
    }

    let args = "pull --no-rebase";
    let pull = runner.git(path, args, Check::Ignore)?;
    if !pull.success() {
        if repo::classify(runner, path)? == RepoState::Conflicted {
            warn!(path = %path.display(), "update ended in merge conflicts");
            println!("{}", pull.combined());
            return Ok(SyncResult { updated: false, conflict: true });
        }
        return Err(FranklinError::CommandFailed {
            command: format!("git {args}"),
            exit_code: pull.exit_code,
            output: pull.combined(),
        });
    }

    let after = repo::head(runner, path)?;
    Ok(SyncResult { updated: before != after, conflict: false })
}

fn commit_local_changes(runner: &CommandRunner<'_>, path: &Path) -> Result<(), FranklinError> {
    runner.git(path, "add -u", Check::ExitCode)?;
    if repo::has_staged_changes(runner, path)? {
        let args = format!("commit -m {}", runner.quote_arg(LOCAL_CHANGES_MESSAGE));
        runner.git(path, &args, Check::ExitCode)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::script::{git_command, Script};
    use crate::exercise::ExerciseNaming;
    use crate::sync::testing::{expect_repo_config, fake_checkout, STATUS};

    fn setup() -> (tempfile::TempDir, Config, RemoteExercise) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config { work_dir: dir.path().to_path_buf(), ..Config::default() };
        let remote = ExerciseNaming::from_config(&config).remote("mbg", "week1");
        (dir, config, remote)
    }

    #[test]
    fn missing_checkout_is_cloned_without_prompt() {
        let (dir, config, remote) = setup();
        let path = dir.path().join("week1");
        let script = Script::new().resolve(&remote).ok(&format!(
            "git clone {} {}",
            shell_words::quote(&remote.clone_url),
            shell_words::quote(&path.to_string_lossy())
        ));
        let ctx = expect_repo_config(script, &path, &config).context();

        let download = down(&ctx, &config, "mbg", "week1").unwrap();
        assert_eq!(download.path, path);
        assert_eq!(download.image, "registry.gitlab.au.dk/franklin/mbg/week1:main");
        assert_eq!(download.result, SyncResult { updated: true, conflict: false });
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn configured_key_is_set_on_clone_and_in_repo_config() {
        let (dir, mut config, remote) = setup();
        config.ssh_key_path = Some("/keys/gitlab".into());
        let path = dir.path().join("week1");
        let script = Script::new().resolve(&remote).ok(&format!(
            "git clone --config 'core.sshCommand=ssh -i /keys/gitlab -o IdentitiesOnly=yes' {} {}",
            shell_words::quote(&remote.clone_url),
            shell_words::quote(&path.to_string_lossy())
        ));
        let ctx = expect_repo_config(script, &path, &config).context();

        down(&ctx, &config, "mbg", "week1").unwrap();
        assert_eq!(ctx.unplayed(), 0);
        let expected = git_command(
            &path,
            "config core.sshCommand 'ssh -i /keys/gitlab -o IdentitiesOnly=yes'",
        );
        let script = expect_repo_config(Script::new(), &path, &config);
        assert!(script.cassette().interactions.iter().any(|i| i.input["command"] == expected));
    }

    #[test]
    fn declined_update_leaves_repository_untouched() {
        let (dir, config, remote) = setup();
        let path = fake_checkout(dir.path(), "week1", &[("notebook.ipynb", "{}")]);
        let ctx = Script::new()
            .resolve(&remote)
            .git(&path, STATUS, 0, "")
            .confirm(false)
            .context();

        let err = down(&ctx, &config, "mbg", "week1").unwrap_err();
        assert!(matches!(err, FranklinError::Aborted));
        assert_eq!(std::fs::read_to_string(path.join("notebook.ipynb")).unwrap(), "{}");
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn local_edits_are_committed_before_pull() {
        let (dir, config, remote) = setup();
        let path = fake_checkout(dir.path(), "week1", &[]);
        let script = Script::new()
            .resolve(&remote)
            .git(&path, STATUS, 0, " M notebook.ipynb\0")
            .confirm(true)
            .git(&path, "rev-parse HEAD", 0, "aaa\n")
            .git_ok(&path, "add -u")
            .git(&path, "diff --cached --quiet", 1, "")
            .git_ok(&path, "commit -m 'Local changes before update'")
            .git_ok(&path, "pull --no-rebase")
            .git(&path, "rev-parse HEAD", 0, "bbb\n");
        let ctx = expect_repo_config(script, &path, &config).context();

        let download = down(&ctx, &config, "mbg", "week1").unwrap();
        assert!(download.result.updated);
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn unchanged_head_is_not_an_update() {
        let (dir, config, remote) = setup();
        let path = fake_checkout(dir.path(), "week1", &[]);
        let script = Script::new()
            .resolve(&remote)
            .git(&path, STATUS, 0, "")
            .confirm(true)
            .git(&path, "rev-parse HEAD", 0, "aaa\n")
            .git(&path, "pull --no-rebase", 0, "Already up to date.\n")
            .git(&path, "rev-parse HEAD", 0, "aaa\n");
        let ctx = expect_repo_config(script, &path, &config).context();

        let download = down(&ctx, &config, "mbg", "week1").unwrap();
        assert!(!download.result.updated);
    }

    #[test]
    fn conflicting_pull_returns_early() {
        let (dir, config, remote) = setup();
        let path = fake_checkout(dir.path(), "week1", &[]);
        let ctx = Script::new()
            .resolve(&remote)
            .git(&path, STATUS, 0, "")
            .confirm(true)
            .git(&path, "rev-parse HEAD", 0, "aaa\n")
            .git(&path, "pull --no-rebase", 1, "CONFLICT (content): Merge conflict in a.py\n")
            .git(&path, STATUS, 0, "UU a.py\0")
            .context();

        let download = down(&ctx, &config, "mbg", "week1").unwrap();
        assert!(download.result.conflict);
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn conflicted_checkout_blocks_update() {
        let (dir, config, remote) = setup();
        let path = fake_checkout(dir.path(), "week1", &[]);
        let ctx = Script::new().resolve(&remote).git(&path, STATUS, 0, "AA a.py\0").context();
        let err = down(&ctx, &config, "mbg", "week1").unwrap_err();
        assert!(matches!(err, FranklinError::MergeConflict { .. }));
    }

    #[test]
    fn concluded_but_uncommitted_merge_points_to_upload() {
        let (dir, config, remote) = setup();
        let path = fake_checkout(dir.path(), "week1", &[(".git/MERGE_HEAD", "abc")]);
        let ctx = Script::new().resolve(&remote).git(&path, STATUS, 0, "M  a.py\0").context();
        let err = down(&ctx, &config, "mbg", "week1").unwrap_err();
        assert!(matches!(err, FranklinError::MergeUnfinished(_)));
        assert!(err.to_string().contains("franklin upload"));
    }

    #[test]
    fn occupied_path_is_not_a_repo() {
        let (dir, config, remote) = setup();
        std::fs::create_dir(dir.path().join("week1")).unwrap();
        let ctx = Script::new().resolve(&remote).context();
        let err = down(&ctx, &config, "mbg", "week1").unwrap_err();
        assert!(matches!(err, FranklinError::NotARepo(_)));
    }

    #[test]
    fn invalid_names_are_rejected_before_any_lookup() {
        let (_dir, config, _) = setup();
        let ctx = Script::new().context();
        let err = down(&ctx, &config, "mbg", "../etc").unwrap_err();
        assert!(matches!(err, FranklinError::InvalidName { .. }));
    }
}
