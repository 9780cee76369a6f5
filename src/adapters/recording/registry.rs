//! Recording adapter for the `ExerciseRegistry` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::exercise::RemoteExercise;
use crate::ports::{Course, ExerciseListing, ExerciseRegistry};

type RegistryResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Records registry answers while delegating to an inner registry.
pub struct RecordingRegistry {
    inner: Box<dyn ExerciseRegistry>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingRegistry {
    /// Creates a new recording registry wrapping the given implementation.
    pub fn new(inner: Box<dyn ExerciseRegistry>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct CourseInput<'a> {
    course: &'a str,
}

#[derive(Serialize)]
pub(crate) struct ExerciseInput<'a> {
    pub(crate) course: &'a str,
    pub(crate) exercise: &'a str,
}

impl ExerciseRegistry for RecordingRegistry {
    fn courses(&self) -> RegistryResult<Vec<Course>> {
        let result = self.inner.courses();
        record_result(&self.recorder, "registry", "courses", &serde_json::json!({}), &result);
        result
    }

    fn exercises(&self, course: &str) -> RegistryResult<Vec<ExerciseListing>> {
        let result = self.inner.exercises(course);
        record_result(&self.recorder, "registry", "exercises", &CourseInput { course }, &result);
        result
    }

    fn resolve(&self, course: &str, exercise: &str) -> RegistryResult<RemoteExercise> {
        let result = self.inner.resolve(course, exercise);
        let input = ExerciseInput { course, exercise };
        record_result(&self.recorder, "registry", "resolve", &input, &result);
        result
    }
}
