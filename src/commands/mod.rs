//! Command dispatch and handlers.

pub mod download;
pub mod exercises;
pub mod jupyter;
pub mod resolve;
pub mod ssh_keygen;
pub mod status;
pub mod upload;

use std::env;
use std::path::PathBuf;

use tracing::debug;

use crate::cassette::session::RecordingSession;
use crate::cli::Command;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::FranklinError;

/// Dispatch a parsed command to its handler.
///
/// `FRANKLIN_REPLAY=<file>` serves every port from a cassette.
/// `FRANKLIN_RECORD=<dir>` runs live and records every port interaction to
/// a cassette in that directory.
///
/// # Errors
///
/// Returns the handler's error, or a configuration error if the context
/// cannot be built.
pub fn dispatch(command: &Command, config: &Config) -> Result<(), FranklinError> {
    if let Ok(path) = env::var("FRANKLIN_REPLAY") {
        debug!(cassette = %path, "replaying");
        let ctx = ServiceContext::replaying(&PathBuf::from(path))?;
        return dispatch_with_context(command, &ctx, config);
    }

    if let Ok(dir) = env::var("FRANKLIN_RECORD") {
        let session = RecordingSession::new(PathBuf::from(dir)).map_err(FranklinError::Config)?;
        let ctx = ServiceContext::recording(config, &session)?;
        let result = dispatch_with_context(command, &ctx, config);
        // Drop context first to release the recorder.
        drop(ctx);
        finish_recording(session)?;
        return result;
    }

    let ctx = ServiceContext::live(config)?;
    dispatch_with_context(command, &ctx, config)
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns the handler's error.
pub fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    config: &Config,
) -> Result<(), FranklinError> {
    match command {
        Command::Download(args) => {
            download::run(ctx, config, args.course.as_deref(), args.exercise.as_deref())
        }
        Command::Upload { path, remove } => upload::run(ctx, config, path, *remove),
        Command::Jupyter(args) => {
            jupyter::run(ctx, config, args.course.as_deref(), args.exercise.as_deref())
        }
        Command::Status { path } => status::run(ctx, path),
        Command::Resolve { path } => resolve::run(ctx, path),
        Command::SshKeygen => ssh_keygen::run(ctx, config),
        Command::Exercises { course } => exercises::run(ctx, course.as_deref()),
    }
}

/// Finish a recording session and print the cassette path.
fn finish_recording(session: RecordingSession) -> Result<(), FranklinError> {
    let path = session.finish().map_err(FranklinError::Config)?;
    eprintln!("Recording saved to: {}", path.display());
    Ok(())
}
