//! `franklin jupyter` command.

use crate::config::Config;
use crate::context::ServiceContext;
use crate::cycle::EditCycle;
use crate::error::FranklinError;

/// Execute the `jupyter` command: one full edit cycle.
///
/// # Errors
///
/// Returns the error of the stage that stopped the cycle.
pub fn run(
    ctx: &ServiceContext,
    config: &Config,
    course: Option<&str>,
    exercise: Option<&str>,
) -> Result<(), FranklinError> {
    EditCycle::new(ctx, config).run(course, exercise)?;
    println!("All done.");
    Ok(())
}
