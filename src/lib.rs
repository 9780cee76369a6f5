//! Core library entry for the `franklin` CLI.
//!
//! Franklin sequences git, ssh, a container runtime and Jupyter so students
//! can download an exercise, work on it and upload it again. Every external
//! tool is reached through a port trait in [`ports`]; [`context`] wires live,
//! recording or replaying adapters behind them.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod cycle;
pub mod error;
pub mod exercise;
pub mod interrupt;
pub mod logging;
pub mod merge_tool;
pub mod picker;
pub mod ports;
pub mod repo;
pub mod runner;
pub mod ssh;
pub mod sync;

use std::path::Path;

use clap::error::ErrorKind;
use clap::Parser;

pub use error::FranklinError;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns [`FranklinError::Usage`] when argument parsing fails, otherwise
/// the error of the command.
pub fn run<I, T>(args: I) -> Result<(), FranklinError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(FranklinError::Usage(err.to_string())),
    };

    logging::init(cli.verbose, Some(Path::new(".")));
    let config = config::Config::load()?;
    tracing::debug!(?config, "configuration loaded");
    commands::dispatch(&cli.command, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let err = run(["franklin", "unknown"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn help_is_not_an_error() {
        assert!(run(["franklin", "--help"]).is_ok());
    }
}
