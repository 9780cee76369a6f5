//! Replaying adapters that replay recorded interactions.
//!
//! All adapters of one context share a single [`CassetteReplayer`], so a
//! cassette can be checked for interactions that were never requested.

pub mod desktop;
pub mod prompt;
pub mod registry;
pub mod shell;

pub use desktop::ReplayingDesktop;
pub use prompt::ReplayingPrompter;
pub use registry::ReplayingRegistry;
pub use shell::ReplayingShellExecutor;

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cassette::replayer::CassetteReplayer;

/// Replayer shared between the adapters of one context.
/// Replayer shared by every adapter of one context.
pub type SharedReplayer = Arc<Mutex<CassetteReplayer>>;

/// Serve the next `port::method` interaction as a `Result<T, _>`.
///
/// Mirror of `recording::record_result`. When `expected_input` is given the
/// recorded input must match it exactly.
pub(crate) fn replay_result<T, I>(
    replayer: &SharedReplayer,
    port: &str,
    method: &str,
    expected_input: Option<&I>,
) -> Result<T, Box<dyn std::error::Error + Send + Sync>>
where
    T: DeserializeOwned,
    I: Serialize,
{
    let output = {
        let mut replayer = replayer.lock().expect("replayer lock poisoned");
        let interaction = match expected_input {
            Some(input) => {
                let input =
                    serde_json::to_value(input).expect("failed to serialize replay input");
                replayer.next_matching(port, method, &input)
            }
            None => replayer.next_interaction(port, method),
        };
        interaction.output.clone()
    };
    if let Some(err) = output.get("Err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Err(msg.into());
    }
    let value = output.get("Ok").cloned().unwrap_or(output);
    serde_json::from_value(value)
        .map_err(|e| format!("{port}::{method}: failed to deserialize: {e}").into())
}
