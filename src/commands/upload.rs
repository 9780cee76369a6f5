//! `franklin upload` command.

use std::path::Path;

use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::FranklinError;
use crate::sync;

/// Execute the `upload` command.
///
/// # Errors
///
/// Returns an error if the upload fails.
pub fn run(
    ctx: &ServiceContext,
    config: &Config,
    path: &Path,
    remove: bool,
) -> Result<(), FranklinError> {
    sync::up(ctx, config, path, remove)?;
    Ok(())
}
