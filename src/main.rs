//! Binary entrypoint for the `franklin` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // Recording and replay are handled in commands::dispatch via
    // FRANKLIN_RECORD=<dir> and FRANKLIN_REPLAY=<file>.
    match franklin::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
