//! Franklin configuration.
//!
//! Settings are resolved in three layers: built-in defaults, then the YAML
//! file at `$FRANKLIN_CONFIG` (or `<config dir>/franklin/config.yaml`), then
//! `FRANKLIN_*` environment variables. A `.env` file in the working
//! directory is loaded into the environment first.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::FranklinError;

/// Explicit configuration handed to every component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitLab host holding the exercise repositories.
    pub gitlab_domain: String,
    /// Top-level GitLab group; courses are its subgroups.
    pub gitlab_group: String,
    /// Container registry host serving exercise images.
    pub registry_domain: String,
    /// YAML exercise listing used instead of the GitLab API when set.
    pub registry_listing: Option<PathBuf>,
    /// Directory exercises are cloned into.
    pub work_dir: PathBuf,
    /// Minimum free disk space, in GB, required to start an edit cycle.
    pub min_free_disk_gb: u64,
    /// Remove the local checkout after a successful upload in the edit cycle.
    pub prune_after_upload: bool,
    /// Commit message offered when uploading.
    pub default_commit_message: String,
    /// Name registered for `git mergetool` / `git difftool`.
    pub merge_tool: String,
    /// Command line git runs as the merge tool.
    pub merge_tool_cmd: String,
    /// Command line git runs as the diff tool.
    pub diff_tool_cmd: String,
    /// Container runtime executable.
    pub container_runtime: String,
    /// Command starting the container runtime; a platform default when unset.
    pub runtime_start_command: Option<String>,
    /// Seconds to wait for the runtime to come up.
    pub runtime_start_timeout_secs: u64,
    /// Seconds between runtime readiness probes.
    pub runtime_poll_secs: u64,
    /// Host port the Jupyter server is published on.
    pub jupyter_port: u16,
    /// Private key used for GitLab; `~/.ssh/id_ed25519` when unset.
    pub ssh_key_path: Option<PathBuf>,
    /// Timeout for the ssh connectivity probe.
    pub ssh_connect_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gitlab_domain: "gitlab.au.dk".into(),
            gitlab_group: "franklin".into(),
            registry_domain: "registry.gitlab.au.dk".into(),
            registry_listing: None,
            work_dir: PathBuf::from("."),
            min_free_disk_gb: 5,
            prune_after_upload: true,
            default_commit_message: "an update".into(),
            merge_tool: "vscode".into(),
            merge_tool_cmd: "code --wait --merge $REMOTE $LOCAL $BASE $MERGED".into(),
            diff_tool_cmd: "code --wait --diff $LOCAL $REMOTE".into(),
            container_runtime: "docker".into(),
            runtime_start_command: None,
            runtime_start_timeout_secs: 120,
            runtime_poll_secs: 2,
            jupyter_port: 8888,
            ssh_key_path: None,
            ssh_connect_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Loads the configuration from file and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or an
    /// environment variable holds an unparsable value.
    pub fn load() -> Result<Self, FranklinError> {
        // A missing .env is normal.
        let _ = dotenvy::dotenv();

        let mut config = match config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Reads a YAML config file; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, FranklinError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FranklinError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
            .map_err(|e| FranklinError::Config(format!("{}: {e}", path.display())))
    }

    /// Parses YAML config text.
    ///
    /// # Errors
    ///
    /// Returns an error string if the YAML is malformed.
    pub fn from_yaml(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| format!("Failed to parse config: {e}"))
    }

    /// Overlays `FRANKLIN_*` variables returned by `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), FranklinError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("FRANKLIN_GITLAB_DOMAIN") {
            self.gitlab_domain = v;
        }
        if let Some(v) = lookup("FRANKLIN_GITLAB_GROUP") {
            self.gitlab_group = v;
        }
        if let Some(v) = lookup("FRANKLIN_REGISTRY_DOMAIN") {
            self.registry_domain = v;
        }
        if let Some(v) = lookup("FRANKLIN_REGISTRY_LISTING") {
            self.registry_listing = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("FRANKLIN_WORK_DIR") {
            self.work_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("FRANKLIN_SSH_KEY") {
            self.ssh_key_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("FRANKLIN_MIN_FREE_DISK_GB") {
            self.min_free_disk_gb = parse_env("FRANKLIN_MIN_FREE_DISK_GB", &v)?;
        }
        if let Some(v) = lookup("FRANKLIN_JUPYTER_PORT") {
            self.jupyter_port = parse_env("FRANKLIN_JUPYTER_PORT", &v)?;
        }
        if let Some(v) = lookup("FRANKLIN_PRUNE_AFTER_UPLOAD") {
            self.prune_after_upload = parse_bool("FRANKLIN_PRUNE_AFTER_UPLOAD", &v)?;
        }
        Ok(())
    }

    /// The private key path, falling back to `~/.ssh/id_ed25519`.
    #[must_use]
    pub fn ssh_key(&self) -> PathBuf {
        self.ssh_key_path.clone().unwrap_or_else(|| {
            dirs::home_dir().unwrap_or_default().join(".ssh").join("id_ed25519")
        })
    }

    /// Value for git's `core.sshCommand` selecting the configured key, or
    /// `None` to let ssh pick its default identities. git runs it through a
    /// POSIX shell on every platform.
    #[must_use]
    pub fn git_ssh_command(&self) -> Option<String> {
        self.ssh_key_path.as_ref().map(|key| {
            format!("ssh -i {} -o IdentitiesOnly=yes", shell_words::quote(&key.to_string_lossy()))
        })
    }
}

fn config_file_path() -> Option<PathBuf> {
    std::env::var("FRANKLIN_CONFIG")
        .map(PathBuf::from)
        .ok()
        .or_else(|| dirs::config_dir().map(|dir| dir.join("franklin").join("config.yaml")))
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, FranklinError> {
    value
        .trim()
        .parse()
        .map_err(|_| FranklinError::Config(format!("{key} has invalid value {value:?}")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, FranklinError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FranklinError::Config(format!("{key} has invalid value {value:?}"))),
    }
}
