//! Exercise identity: name validation and the GitLab naming scheme.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::FranklinError;

const MAX_NAME_LEN: usize = 100;

/// A remote exercise: one GitLab repository plus the image that runs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteExercise {
    /// Course the exercise belongs to.
    pub course: String,
    /// Exercise name; also the name of the local checkout.
    pub name: String,
    /// URL passed to `git clone`.
    pub clone_url: String,
    /// Container image reference, e.g. `registry.gitlab.au.dk/franklin/mbg/week1:main`.
    pub image: String,
}

/// Derives clone URLs and image references from course and exercise names.
#[derive(Debug, Clone)]
pub struct ExerciseNaming {
    gitlab_domain: String,
    group: String,
    registry_domain: String,
}

impl ExerciseNaming {
    /// Builds the naming scheme from the configured GitLab group.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            gitlab_domain: config.gitlab_domain.clone(),
            group: config.gitlab_group.clone(),
            registry_domain: config.registry_domain.clone(),
        }
    }

    /// Ssh clone URL of an exercise repository.
    #[must_use]
    pub fn clone_url(&self, course: &str, exercise: &str) -> String {
        format!("git@{}:{}/{course}/{exercise}.git", self.gitlab_domain, self.group)
    }

    /// Image reference built by the exercise repository's CI.
    #[must_use]
    pub fn image(&self, course: &str, exercise: &str) -> String {
        format!("{}/{}/{course}/{exercise}:main", self.registry_domain, self.group)
    }

    /// Resolves names to a [`RemoteExercise`] using the default scheme.
    #[must_use]
    pub fn remote(&self, course: &str, exercise: &str) -> RemoteExercise {
        RemoteExercise {
            course: course.to_string(),
            name: exercise.to_string(),
            clone_url: self.clone_url(course, exercise),
            image: self.image(course, exercise),
        }
    }
}

/// Checks that `name` can be used as a course or exercise name.
///
/// Names end up in GitLab project paths and in local directory names, so
/// they must start with a letter or digit and contain only letters, digits,
/// `.`, `_` and `-`.
///
/// # Errors
///
/// Returns [`FranklinError::InvalidName`] describing the first rule broken.
pub fn validate_name(name: &str) -> Result<(), FranklinError> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("name pattern compiles"));

    let reject = |reason| Err(FranklinError::InvalidName { name: name.to_string(), reason });
    if name.is_empty() {
        return reject("name is empty");
    }
    if name.len() > MAX_NAME_LEN {
        return reject("name is longer than 100 characters");
    }
    if !pattern.is_match(name) {
        return reject("use letters, digits, '.', '_' and '-', starting with a letter or digit");
    }
    if name.ends_with(".git") || name.ends_with(".atom") {
        return reject("name may not end in .git or .atom");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_names() {
        for name in ["mbg", "week-1", "exercise_02", "v1.2", "2024"] {
            assert!(validate_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_path_like_names() {
        for name in ["", "..", ".hidden", "a/b", "-flag", "with space", "repo.git", "feed.atom"] {
            assert!(validate_name(name).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn rejects_overlong_names() {
        let name = "x".repeat(101);
        let err = validate_name(&name).unwrap_err();
        assert!(err.to_string().contains("longer than 100"));
    }

    #[test]
    fn naming_scheme_follows_group_layout() {
        let naming = ExerciseNaming::from_config(&Config::default());
        let remote = naming.remote("mbg", "week1");
        assert_eq!(remote.clone_url, "git@gitlab.au.dk:franklin/mbg/week1.git");
        assert_eq!(remote.image, "registry.gitlab.au.dk/franklin/mbg/week1:main");
    }
}
