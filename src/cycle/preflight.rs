//! Checks run before an exercise is downloaded.

use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::FranklinError;
use crate::runner::{Check, CommandRunner, Platform};

const KB_PER_GB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Probes ssh access to the GitLab host, with the configured key when
/// there is one.
///
/// # Errors
///
/// Returns [`FranklinError::Environment`] when the host answers but rejects
/// the key, and [`FranklinError::NoConnectivity`] when it cannot be reached.
pub fn check_connectivity(runner: &CommandRunner<'_>, config: &Config) -> Result<(), FranklinError> {
    let host = &config.gitlab_domain;
    let identity = config
        .ssh_key_path
        .as_ref()
        .map(|key| format!(" -i {} -o IdentitiesOnly=yes", runner.quote(key)))
        .unwrap_or_default();
    let command = format!(
        "ssh{identity} -T -o BatchMode=yes -o ConnectTimeout={} git@{host}",
        config.ssh_connect_timeout_secs
    );
    let output = runner.run(&command, Check::Ignore)?;
    if output.success() {
        return Ok(());
    }
    let detail = output.combined();
    if detail.contains("Permission denied") {
        return Err(FranklinError::Environment(format!(
            "{host} rejected your ssh key; run `franklin ssh-keygen` and add the key to GitLab"
        )));
    }
    Err(FranklinError::NoConnectivity { host: host.clone(), detail })
}

/// Checks that git and the container runtime are installed and that git
/// knows who the user is, asking for a missing name or email.
///
/// # Errors
///
/// Returns [`FranklinError::Environment`] if a tool is missing, and prompt
/// or command errors while filling in the git identity.
pub fn check_environment(ctx: &ServiceContext, config: &Config) -> Result<(), FranklinError> {
    let runner = ctx.runner();
    for tool in ["git", config.container_runtime.as_str()] {
        let output = runner.run(&format!("{tool} --version"), Check::Ignore)?;
        if !output.success() {
            return Err(FranklinError::Environment(format!("{tool} is not installed")));
        }
        debug!(tool, version = output.stdout.trim(), "tool found");
    }

    for (key, question) in [("user.name", "Your full name"), ("user.email", "Your email address")]
    {
        let output = runner.run(&format!("git config --global {key}"), Check::Ignore)?;
        if output.success() && !output.stdout.trim().is_empty() {
            continue;
        }
        let value = ctx.prompt.input(question, "").map_err(FranklinError::prompt)?;
        let value = value.trim();
        if value.is_empty() {
            return Err(FranklinError::Environment(format!("git needs {key} to be set")));
        }
        let command = format!("git config --global {key} {}", runner.quote_arg(value));
        runner.run(&command, Check::ExitCode)?;
        info!(key, "configured git identity");
    }
    Ok(())
}

/// Checks free space where exercises are stored.
///
/// # Errors
///
/// Returns [`FranklinError::InsufficientDisk`] below the configured minimum,
/// or [`FranklinError::Environment`] if the free space cannot be read.
#[allow(clippy::cast_precision_loss)]
pub fn check_disk(runner: &CommandRunner<'_>, config: &Config) -> Result<(), FranklinError> {
    let available_gb = free_disk_gb(runner, existing_ancestor(&config.work_dir))?;
    debug!(available_gb, "free disk space");
    if available_gb < config.min_free_disk_gb as f64 {
        return Err(FranklinError::InsufficientDisk {
            available_gb,
            required_gb: config.min_free_disk_gb,
        });
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn free_disk_gb(runner: &CommandRunner<'_>, dir: &Path) -> Result<f64, FranklinError> {
    let unreadable = |output: &str| {
        FranklinError::Environment(format!("cannot read free disk space: {}", output.trim()))
    };
    match runner.platform() {
        Platform::Posix => {
            let output = runner.run(&format!("df -Pk {}", runner.quote(dir)), Check::ExitCode)?;
            parse_df_available_kb(&output.stdout)
                .map(|kb| kb as f64 / KB_PER_GB)
                .ok_or_else(|| unreadable(&output.stdout))
        }
        Platform::Windows => {
            let literal = dir.to_string_lossy().replace('\'', "''");
            let command = format!(
                "powershell -NoProfile -Command \"(Get-Item -LiteralPath '{literal}').PSDrive.Free\""
            );
            let output = runner.run(&command, Check::ExitCode)?;
            output
                .stdout
                .trim()
                .parse::<u64>()
                .map(|bytes| bytes as f64 / BYTES_PER_GB)
                .map_err(|_| unreadable(&output.stdout))
        }
    }
}

/// `dir` itself or its closest ancestor that exists; the work directory is
/// only created by the first download.
fn existing_ancestor(dir: &Path) -> &Path {
    dir.ancestors()
        .find(|p| !p.as_os_str().is_empty() && p.exists())
        .unwrap_or_else(|| Path::new("."))
}

/// Available kilobytes from POSIX `df -Pk` output.
#[must_use]
pub fn parse_df_available_kb(output: &str) -> Option<u64> {
    output.lines().skip(1).last()?.split_whitespace().nth(3)?.parse().ok()
}

/// Makes sure the container runtime answers, starting it if needed.
///
/// # Errors
///
/// Returns [`FranklinError::RuntimeUnavailable`] if it does not come up
/// within the configured timeout.
pub fn ensure_runtime(runner: &CommandRunner<'_>, config: &Config) -> Result<(), FranklinError> {
    let info = format!("{} info", config.container_runtime);
    if runner.run(&info, Check::Ignore)?.success() {
        return Ok(());
    }

    let start = config
        .runtime_start_command
        .clone()
        .unwrap_or_else(|| default_start_command(runner.platform()));
    info!(command = %start, "starting container runtime");
    println!("Starting {}...", config.container_runtime);
    let started = runner.run(&start, Check::Ignore)?;
    if !started.success() {
        warn!(output = %started.combined(), "runtime start command failed");
    }

    let poll = config.runtime_poll_secs;
    let attempts = (config.runtime_start_timeout_secs / poll.max(1)).max(1);
    let mut last = String::new();
    for _ in 0..attempts {
        thread::sleep(Duration::from_secs(poll));
        let output = runner.run(&info, Check::Ignore)?;
        if output.success() {
            return Ok(());
        }
        last = output.combined();
    }
    Err(FranklinError::RuntimeUnavailable(format!(
        "{} did not start within {} seconds\n{last}",
        config.container_runtime, config.runtime_start_timeout_secs
    )))
}

fn default_start_command(platform: Platform) -> String {
    match platform {
        Platform::Windows => {
            r#"start "" "C:\Program Files\Docker\Docker\Docker Desktop.exe""#.to_string()
        }
        Platform::Posix if cfg!(target_os = "macos") => "open -a Docker".to_string(),
        Platform::Posix => "systemctl --user start docker-desktop".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::script::Script;

    const SSH: &str = "ssh -T -o BatchMode=yes -o ConnectTimeout=10 git@gitlab.au.dk";

    fn fast_runtime() -> Config {
        Config {
            runtime_start_command: Some("open -a Docker".into()),
            runtime_start_timeout_secs: 3,
            runtime_poll_secs: 0,
            ..Config::default()
        }
    }

    #[test]
    fn reachable_host_passes() {
        let ctx = Script::new().shell(SSH, 0, "Welcome to GitLab, @student!\n", "").context();
        check_connectivity(&ctx.runner(), &Config::default()).unwrap();
    }

    #[test]
    fn rejected_key_points_to_keygen() {
        let ctx = Script::new()
            .shell(SSH, 255, "", "git@gitlab.au.dk: Permission denied (publickey).")
            .context();
        let err = check_connectivity(&ctx.runner(), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("franklin ssh-keygen"));
    }

    #[test]
    fn configured_key_is_used_for_the_probe() {
        let config =
            Config { ssh_key_path: Some("/keys/gitlab key".into()), ..Config::default() };
        let ctx = Script::new()
            .shell(
                "ssh -i '/keys/gitlab key' -o IdentitiesOnly=yes -T -o BatchMode=yes \
                 -o ConnectTimeout=10 git@gitlab.au.dk",
                0,
                "Welcome to GitLab, @student!\n",
                "",
            )
            .context();
        check_connectivity(&ctx.runner(), &config).unwrap();
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn unreachable_host_is_no_connectivity() {
        let ctx = Script::new()
            .shell(SSH, 255, "", "ssh: Could not resolve hostname gitlab.au.dk")
            .context();
        let err = check_connectivity(&ctx.runner(), &Config::default()).unwrap_err();
        assert!(matches!(err, FranklinError::NoConnectivity { .. }));
    }

    #[test]
    fn missing_git_identity_is_prompted_for() {
        let ctx = Script::new()
            .shell("git --version", 0, "git version 2.45.0\n", "")
            .shell("docker --version", 0, "Docker version 27.0.3\n", "")
            .shell("git config --global user.name", 0, "Ada Lovelace\n", "")
            .shell("git config --global user.email", 1, "", "")
            .input("ada@example.org")
            .ok("git config --global user.email ada@example.org")
            .context();
        check_environment(&ctx, &Config::default()).unwrap();
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn missing_runtime_is_an_environment_error() {
        let ctx = Script::new()
            .shell("git --version", 0, "git version 2.45.0\n", "")
            .shell("docker --version", 127, "", "docker: not found")
            .context();
        let err = check_environment(&ctx, &Config::default()).unwrap_err();
        assert_eq!(err.to_string(), "docker is not installed");
    }

    #[test]
    fn df_output_is_parsed() {
        let out = "Filesystem 1024-blocks Used Available Capacity Mounted on\n\
                   /dev/sda1 488245288 200000000 288245288 41% /\n";
        assert_eq!(parse_df_available_kb(out), Some(288_245_288));
        assert_eq!(parse_df_available_kb("garbage"), None);
    }

    #[test]
    fn low_disk_space_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config { work_dir: dir.path().to_path_buf(), ..Config::default() };
        let ctx = Script::new()
            .shell(
                &format!("df -Pk {}", shell_words::quote(&dir.path().to_string_lossy())),
                0,
                "Filesystem 1024-blocks Used Available Capacity Mounted on\n/dev/sda1 10 8 2097152 99% /\n",
                "",
            )
            .context();
        let err = check_disk(&ctx.runner(), &config).unwrap_err();
        match err {
            FranklinError::InsufficientDisk { available_gb, required_gb } => {
                assert!((available_gb - 2.0).abs() < f64::EPSILON);
                assert_eq!(required_gb, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_work_dir_is_measured_at_its_parent() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            Config { work_dir: dir.path().join("exercises/2026"), ..Config::default() };
        let ctx = Script::new()
            .shell(
                &format!("df -Pk {}", shell_words::quote(&dir.path().to_string_lossy())),
                0,
                "Filesystem 1024-blocks Used Available Capacity Mounted on\n/dev/x 1 1 104857600 1% /\n",
                "",
            )
            .context();
        check_disk(&ctx.runner(), &config).unwrap();
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn relative_missing_work_dir_falls_back_to_current_dir() {
        assert_eq!(existing_ancestor(Path::new("no-such-dir-franklin")), Path::new("."));
    }

    #[test]
    fn running_runtime_is_left_alone() {
        let ctx = Script::new().ok("docker info").context();
        ensure_runtime(&ctx.runner(), &fast_runtime()).unwrap();
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn stopped_runtime_is_started_and_polled() {
        let ctx = Script::new()
            .shell("docker info", 1, "", "Cannot connect to the Docker daemon")
            .ok("open -a Docker")
            .shell("docker info", 1, "", "Cannot connect to the Docker daemon")
            .ok("docker info")
            .context();
        ensure_runtime(&ctx.runner(), &fast_runtime()).unwrap();
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn runtime_that_never_starts_times_out() {
        let mut script = Script::new().shell("docker info", 1, "", "down").ok("open -a Docker");
        for _ in 0..3 {
            script = script.shell("docker info", 1, "", "still down");
        }
        let ctx = script.context();
        let err = ensure_runtime(&ctx.runner(), &fast_runtime()).unwrap_err();
        assert!(matches!(err, FranklinError::RuntimeUnavailable(_)));
        assert_eq!(ctx.unplayed(), 0);
    }
}
