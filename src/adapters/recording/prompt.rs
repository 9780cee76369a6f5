//! Recording adapter for the `Prompter` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::Prompter;

type PromptResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Records the user's answers while delegating to an inner prompter.
pub struct RecordingPrompter {
    inner: Box<dyn Prompter>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingPrompter {
    /// Creates a new recording prompter wrapping the given implementation.
    pub fn new(inner: Box<dyn Prompter>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct QuestionInput<'a, D: Serialize> {
    message: &'a str,
    default: D,
}

#[derive(Serialize)]
struct SelectInput<'a> {
    message: &'a str,
    options: &'a [String],
}

#[derive(Serialize)]
struct MessageInput<'a> {
    message: &'a str,
}

impl Prompter for RecordingPrompter {
    fn confirm(&self, message: &str, default: bool) -> PromptResult<bool> {
        let result = self.inner.confirm(message, default);
        record_result(&self.recorder, "prompt", "confirm", &QuestionInput { message, default }, &result);
        result
    }

    fn input(&self, message: &str, default: &str) -> PromptResult<String> {
        let result = self.inner.input(message, default);
        record_result(&self.recorder, "prompt", "input", &QuestionInput { message, default }, &result);
        result
    }

    fn select(&self, message: &str, options: &[String]) -> PromptResult<usize> {
        let result = self.inner.select(message, options);
        record_result(&self.recorder, "prompt", "select", &SelectInput { message, options }, &result);
        result
    }

    fn pause(&self, message: &str) -> PromptResult<()> {
        let result = self.inner.pause(message);
        record_result(&self.recorder, "prompt", "pause", &MessageInput { message }, &result);
        result
    }
}
