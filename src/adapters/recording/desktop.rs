//! Recording adapter for the `Desktop` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::Desktop;

/// Records browser and clipboard hand-offs while delegating to an inner desktop.
pub struct RecordingDesktop {
    inner: Box<dyn Desktop>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingDesktop {
    /// Creates a new recording desktop wrapping the given implementation.
    pub fn new(inner: Box<dyn Desktop>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
pub(crate) struct UrlInput<'a> {
    pub(crate) url: &'a str,
}

#[derive(Serialize)]
struct TextInput<'a> {
    text: &'a str,
}

impl Desktop for RecordingDesktop {
    fn open_url(&self, url: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let result = self.inner.open_url(url);
        record_result(&self.recorder, "desktop", "open_url", &UrlInput { url }, &result);
        result
    }

    fn copy_to_clipboard(
        &self,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let result = self.inner.copy_to_clipboard(text);
        record_result(&self.recorder, "desktop", "copy_to_clipboard", &TextInput { text }, &result);
        result
    }
}
