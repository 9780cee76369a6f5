//! Recording adapters that capture interactions to cassettes.

pub mod desktop;
pub mod prompt;
pub mod registry;
pub mod shell;

pub use desktop::RecordingDesktop;
pub use prompt::RecordingPrompter;
pub use registry::RecordingRegistry;
pub use shell::RecordingShellExecutor;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;

/// Record a `Result<T, E>` interaction using the Ok/Err JSON convention.
///
/// Mirror of `replaying::replay_result`.
///
/// Convention:
/// - `Ok(v)` is serialized as `{"Ok": v}`
/// - `Err(e)` is serialized as `{"Err": e.to_string()}`
pub(crate) fn record_result<T, E, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize,
{
    let input_json = serde_json::to_value(input).expect("failed to serialize recording input");

    let output_json = match result {
        Ok(v) => {
            let inner = serde_json::to_value(v).expect("failed to serialize Ok value");
            serde_json::json!({ "Ok": inner })
        }
        Err(e) => serde_json::json!({ "Err": e.to_string() }),
    };

    let mut guard = recorder.lock().expect("recorder lock poisoned");
    guard.record(port, method, input_json, output_json);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_recorded_as_messages() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            dir.path().join("c.cassette.yaml"),
            "errors",
        )));
        let failed: Result<u32, String> = Err("no display".into());
        record_result(&recorder, "desktop", "copy_to_clipboard", &"key", &failed);
        let ok: Result<u32, String> = Ok(7);
        record_result(&recorder, "prompt", "select", &"Course:", &ok);

        let recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
        let path = recorder.finish().unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Err: no display"));
        assert!(content.contains("Ok: 7"));
    }
}
