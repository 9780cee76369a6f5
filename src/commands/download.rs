//! `franklin download` command.

use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::FranklinError;
use crate::picker;
use crate::sync;

/// Execute the `download` command.
///
/// # Errors
///
/// Returns an error if picking or downloading fails, including a download
/// that ends in merge conflicts.
pub fn run(
    ctx: &ServiceContext,
    config: &Config,
    course: Option<&str>,
    exercise: Option<&str>,
) -> Result<(), FranklinError> {
    let (course, exercise) = picker::choose(ctx, course, exercise)?;
    let download = sync::down(ctx, config, &course, &exercise)?;
    if download.result.conflict {
        return Err(FranklinError::MergeConflict { path: download.path });
    }
    if download.result.updated {
        println!("{exercise} is ready in {}.", download.path.display());
    } else {
        println!("{exercise} in {} is already up to date.", download.path.display());
    }
    Ok(())
}
