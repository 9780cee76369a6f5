//! Recording session capturing every port into one cassette file.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::recorder::CassetteRecorder;

/// Owns the recorder shared by the recording adapters of one invocation.
///
/// The cassette is written to `<dir>/<timestamp>.cassette.yaml`.
pub struct RecordingSession {
    /// Recorder shared by all recording adapters.
    pub recorder: Arc<Mutex<CassetteRecorder>>,
    path: PathBuf,
}

impl RecordingSession {
    /// Create a new recording session writing into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if a cassette with the same timestamp already exists
    /// or the directory cannot be created.
    pub fn new(dir: PathBuf) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;
        // Pruning may change the working directory before the cassette is written.
        let dir = dir
            .canonicalize()
            .map_err(|e| format!("Failed to resolve cassette directory: {e}"))?;
        let path = dir.join(format!("{timestamp}.cassette.yaml"));

        if path.exists() {
            return Err(format!("Cassette already exists: {}", path.display()));
        }

        let recorder = CassetteRecorder::new(&path, format!("franklin-{timestamp}"));
        Ok(Self { recorder: Arc::new(Mutex::new(recorder)), path })
    }

    /// Path the cassette will be written to.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Write the cassette file.
    ///
    /// All recording adapters must have been dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if adapters still hold the recorder or the file
    /// cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapters still hold the recorder".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}
