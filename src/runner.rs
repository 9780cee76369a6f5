//! Command runner: builds command lines and turns exit codes into errors.

use std::path::Path;

use tracing::debug;

use crate::error::FranklinError;
use crate::ports::shell::{ShellExecutor, ShellOutput};

/// Shell dialect used when quoting arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `sh`-compatible quoting.
    Posix,
    /// `cmd.exe` quoting.
    Windows,
}

impl Platform {
    /// Platform of the running process.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

/// Whether a non-zero exit code should become an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Fail with [`FranklinError::CommandFailed`] on a non-zero exit.
    ExitCode,
    /// Hand the output back whatever the exit code.
    Ignore,
}

/// Runs commands through a [`ShellExecutor`].
pub struct CommandRunner<'a> {
    shell: &'a dyn ShellExecutor,
    platform: Platform,
}

impl<'a> CommandRunner<'a> {
    /// Creates a runner quoting for `platform`.
    #[must_use]
    pub fn new(shell: &'a dyn ShellExecutor, platform: Platform) -> Self {
        Self { shell, platform }
    }

    /// Shell dialect this runner quotes for.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Runs `command`, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns [`FranklinError::Spawn`] if the command cannot be started and,
    /// with [`Check::ExitCode`], [`FranklinError::CommandFailed`] on a
    /// non-zero exit.
    pub fn run(&self, command: &str, check: Check) -> Result<ShellOutput, FranklinError> {
        let output = self.shell.run(command).map_err(|e| FranklinError::Spawn {
            command: command.to_string(),
            message: e.to_string(),
        })?;
        debug!(command, exit_code = output.exit_code, "command finished");
        if check == Check::ExitCode && !output.success() {
            return Err(FranklinError::CommandFailed {
                command: command.to_string(),
                exit_code: output.exit_code,
                output: output.combined(),
            });
        }
        Ok(output)
    }

    /// Runs `git -C <repo> <args>`.
    ///
    /// `args` is inserted verbatim; quote paths and free text with
    /// [`quote`](Self::quote) / [`quote_arg`](Self::quote_arg).
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn git(&self, repo: &Path, args: &str, check: Check) -> Result<ShellOutput, FranklinError> {
        self.run(&format!("git -C {} {args}", self.quote(repo)), check)
    }

    /// Runs `command` with the terminal attached; returns its exit code.
    ///
    /// # Errors
    ///
    /// Returns [`FranklinError::Spawn`] if the command cannot be started and,
    /// with [`Check::ExitCode`], [`FranklinError::CommandFailed`] on a
    /// non-zero exit.
    pub fn interactive(&self, command: &str, check: Check) -> Result<i32, FranklinError> {
        let exit_code = self.shell.run_interactive(command).map_err(|e| FranklinError::Spawn {
            command: command.to_string(),
            message: e.to_string(),
        })?;
        debug!(command, exit_code, "interactive command finished");
        if check == Check::ExitCode && exit_code != 0 {
            return Err(FranklinError::CommandFailed {
                command: command.to_string(),
                exit_code,
                output: String::new(),
            });
        }
        Ok(exit_code)
    }

    /// Quotes a path for the runner's shell.
    #[must_use]
    pub fn quote(&self, path: &Path) -> String {
        self.quote_arg(&path.to_string_lossy())
    }

    /// Quotes a free-text argument for the runner's shell.
    #[must_use]
    pub fn quote_arg(&self, arg: &str) -> String {
        match self.platform {
            Platform::Posix => shell_words::quote(arg).into_owned(),
            Platform::Windows => {
                if !arg.is_empty() && !arg.contains([' ', '\t', '"', '&', '|', '<', '>', '^']) {
                    arg.to_string()
                } else {
                    format!("\"{}\"", arg.replace('"', "\"\""))
                }
            }
        }
    }
}
