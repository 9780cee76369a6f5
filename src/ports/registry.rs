//! Exercise registry port listing courses and their exercises.

use serde::{Deserialize, Serialize};

use crate::exercise::RemoteExercise;

/// A course offered by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Path-safe course name, e.g. `"mbg"`.
    pub name: String,
    /// Human-readable title shown in the picker.
    pub title: String,
}

/// An exercise listed under a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseListing {
    /// Path-safe exercise name, also the local directory name.
    pub name: String,
    /// Human-readable title shown in the picker.
    pub title: String,
}

/// Lists exercises and resolves them to clone URLs and images.
///
/// The registry is owned by an external service (GitLab); this side only
/// reads from it.
pub trait ExerciseRegistry: Send + Sync {
    /// Lists all courses.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be queried.
    fn courses(&self) -> Result<Vec<Course>, Box<dyn std::error::Error + Send + Sync>>;

    /// Lists the exercises of one course.
    ///
    /// # Errors
    ///
    /// Returns an error if the course is unknown or the registry cannot be queried.
    fn exercises(
        &self,
        course: &str,
    ) -> Result<Vec<ExerciseListing>, Box<dyn std::error::Error + Send + Sync>>;

    /// Resolves a (course, exercise) pair to its remote repository and image.
    ///
    /// # Errors
    ///
    /// Returns an error if the exercise is unknown.
    fn resolve(
        &self,
        course: &str,
        exercise: &str,
    ) -> Result<RemoteExercise, Box<dyn std::error::Error + Send + Sync>>;
}
