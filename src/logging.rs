//! Tracing setup: terse stderr output plus a debug log file.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Name of the log file written to the working directory.
pub const LOG_FILE: &str = "franklin.log";

/// Filter directive for the stderr layer at a given `-v` count.
#[must_use]
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs the global subscriber.
///
/// Stderr is filtered by `FRANKLIN_LOG` when set, else by `verbose`. When
/// `log_dir` is given, everything at debug level is also appended to
/// `<log_dir>/franklin.log`; failure to open it only loses that layer.
/// Calling this twice is harmless.
pub fn init(verbose: u8, log_dir: Option<&Path>) {
    let stderr_filter = EnvFilter::try_from_env("FRANKLIN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbose)));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(stderr_filter);

    let file_layer = log_dir
        .and_then(|dir| File::options().create(true).append(true).open(dir.join(LOG_FILE)).ok())
        .map(|file| {
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(EnvFilter::new("franklin=debug"))
        });

    let _ = tracing_subscriber::registry().with(stderr_layer).with(file_layer).try_init();
}
