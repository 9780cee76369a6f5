//! Replaying adapter for the `ExerciseRegistry` port.

use super::{replay_result, SharedReplayer};
use crate::adapters::recording::registry::ExerciseInput;
use crate::exercise::RemoteExercise;
use crate::ports::registry::{Course, ExerciseListing, ExerciseRegistry};

type RegistryResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Replays recorded registry answers.
pub struct ReplayingRegistry {
    replayer: SharedReplayer,
}

impl ReplayingRegistry {
    /// Creates a new replaying registry from a shared replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl ExerciseRegistry for ReplayingRegistry {
    fn courses(&self) -> RegistryResult<Vec<Course>> {
        replay_result::<_, ()>(&self.replayer, "registry", "courses", None)
    }

    fn exercises(&self, _course: &str) -> RegistryResult<Vec<ExerciseListing>> {
        replay_result::<_, ()>(&self.replayer, "registry", "exercises", None)
    }

    fn resolve(&self, course: &str, exercise: &str) -> RegistryResult<RemoteExercise> {
        let input = ExerciseInput { course, exercise };
        replay_result(&self.replayer, "registry", "resolve", Some(&input))
    }
}
