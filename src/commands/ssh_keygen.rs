//! `franklin ssh-keygen` command.

use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::FranklinError;
use crate::ssh;

/// Execute the `ssh-keygen` command.
///
/// # Errors
///
/// Returns an error if the key cannot be created or read.
pub fn run(ctx: &ServiceContext, config: &Config) -> Result<(), FranklinError> {
    let key = ssh::setup_key(ctx, config)?;
    println!("Using ssh key {}.", key.display());
    Ok(())
}
