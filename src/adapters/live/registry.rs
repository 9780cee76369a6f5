//! Live exercise registries: the GitLab REST API and static YAML listings.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::error::FranklinError;
use crate::exercise::{ExerciseNaming, RemoteExercise};
use crate::ports::registry::{Course, ExerciseListing, ExerciseRegistry};

type RegistryResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Registry backed by the GitLab group holding the courses.
///
/// Courses are the group's subgroups and exercises are the projects in a
/// course subgroup. Requests run on a private current-thread runtime so the
/// rest of franklin stays synchronous.
pub struct GitLabRegistry {
    client: Client,
    runtime: Runtime,
    api: String,
    group: String,
    naming: ExerciseNaming,
}

/// Subset of a GitLab group as returned by `/groups/:id/subgroups`.
#[derive(Deserialize)]
struct GitLabGroup {
    path: String,
    name: String,
}

/// Subset of a GitLab project as returned by `/groups/:id/projects`.
#[derive(Deserialize)]
struct GitLabProject {
    path: String,
    name: String,
    #[serde(default)]
    ssh_url_to_repo: Option<String>,
}

impl GitLabRegistry {
    /// Creates a registry for `https://<domain>/api/v4`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or its runtime cannot be built.
    pub fn new(domain: &str, group: &str, naming: ExerciseNaming) -> Result<Self, FranklinError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FranklinError::Registry(format!("Failed to build HTTP client: {e}")))?;
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            client,
            runtime,
            api: format!("https://{domain}/api/v4"),
            group: group.to_string(),
            naming,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> RegistryResult<T> {
        debug!(url, "querying GitLab");
        self.runtime.block_on(fetch_json(&self.client, url))
    }
}

async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str) -> RegistryResult<T> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("GET {url} returned {status}").into());
    }
    Ok(response.json::<T>().await?)
}

/// Encodes a namespaced GitLab path for use as an `:id` segment.
fn encode_path(parts: &[&str]) -> String {
    parts.join("%2F")
}

impl ExerciseRegistry for GitLabRegistry {
    fn courses(&self) -> RegistryResult<Vec<Course>> {
        let url = format!("{}/groups/{}/subgroups?per_page=100", self.api, self.group);
        let groups: Vec<GitLabGroup> = self.get_json(&url)?;
        Ok(groups.into_iter().map(|g| Course { name: g.path, title: g.name }).collect())
    }

    fn exercises(&self, course: &str) -> RegistryResult<Vec<ExerciseListing>> {
        let url = format!(
            "{}/groups/{}/projects?per_page=100",
            self.api,
            encode_path(&[self.group.as_str(), course])
        );
        let projects: Vec<GitLabProject> = self.get_json(&url)?;
        Ok(projects
            .into_iter()
            .map(|p| ExerciseListing { name: p.path, title: p.name })
            .collect())
    }

    fn resolve(&self, course: &str, exercise: &str) -> RegistryResult<RemoteExercise> {
        let id = encode_path(&[self.group.as_str(), course, exercise]);
        let url = format!("{}/projects/{id}", self.api);
        let project: GitLabProject = self.get_json(&url)?;
        let mut remote = self.naming.remote(course, &project.path);
        if let Some(ssh_url) = project.ssh_url_to_repo {
            remote.clone_url = ssh_url;
        }
        Ok(remote)
    }
}

/// Static listing file, as an alternative to querying GitLab.
///
/// ```yaml
/// courses:
///   - name: mbg
///     title: Molecular Biology
///     exercises:
///       - name: week1
///         image: registry.example.org/mbg/week1:main   # optional
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Listing {
    /// Listed courses.
    #[serde(default)]
    pub courses: Vec<ListedCourse>,
}

/// A course in a [`Listing`].
#[derive(Debug, Clone, Deserialize)]
pub struct ListedCourse {
    /// Course name.
    pub name: String,
    /// Title shown in the picker; the name when absent.
    #[serde(default)]
    pub title: Option<String>,
    /// Exercises of the course.
    #[serde(default)]
    pub exercises: Vec<ListedExercise>,
}

/// An exercise in a [`Listing`].
#[derive(Debug, Clone, Deserialize)]
pub struct ListedExercise {
    /// Exercise name.
    pub name: String,
    /// Title shown in the picker; the name when absent.
    #[serde(default)]
    pub title: Option<String>,
    /// Clone URL overriding the GitLab naming scheme.
    #[serde(default)]
    pub clone_url: Option<String>,
    /// Image overriding the GitLab naming scheme.
    #[serde(default)]
    pub image: Option<String>,
}

/// Registry serving a [`Listing`].
pub struct ListingRegistry {
    listing: Listing,
    naming: ExerciseNaming,
}

impl ListingRegistry {
    /// Wraps an in-memory listing.
    #[must_use]
    pub fn new(listing: Listing, naming: ExerciseNaming) -> Self {
        Self { listing, naming }
    }

    /// Loads a YAML listing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path, naming: ExerciseNaming) -> Result<Self, FranklinError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FranklinError::Registry(format!("Failed to read listing {}: {e}", path.display()))
        })?;
        let listing = serde_yaml::from_str(&content).map_err(|e| {
            FranklinError::Registry(format!("Failed to parse listing {}: {e}", path.display()))
        })?;
        Ok(Self::new(listing, naming))
    }

    fn course(&self, course: &str) -> RegistryResult<&ListedCourse> {
        self.listing
            .courses
            .iter()
            .find(|c| c.name == course)
            .ok_or_else(|| format!("unknown course {course:?}").into())
    }
}

impl ExerciseRegistry for ListingRegistry {
    fn courses(&self) -> RegistryResult<Vec<Course>> {
        Ok(self
            .listing
            .courses
            .iter()
            .map(|c| Course {
                name: c.name.clone(),
                title: c.title.clone().unwrap_or_else(|| c.name.clone()),
            })
            .collect())
    }

    fn exercises(&self, course: &str) -> RegistryResult<Vec<ExerciseListing>> {
        Ok(self
            .course(course)?
            .exercises
            .iter()
            .map(|e| ExerciseListing {
                name: e.name.clone(),
                title: e.title.clone().unwrap_or_else(|| e.name.clone()),
            })
            .collect())
    }

    fn resolve(&self, course: &str, exercise: &str) -> RegistryResult<RemoteExercise> {
        let listed = self
            .course(course)?
            .exercises
            .iter()
            .find(|e| e.name == exercise)
            .ok_or_else(|| format!("unknown exercise {exercise:?} in course {course:?}"))?;
        let mut remote = self.naming.remote(course, exercise);
        if let Some(url) = &listed.clone_url {
            remote.clone_url.clone_from(url);
        }
        if let Some(image) = &listed.image {
            remote.image.clone_from(image);
        }
        Ok(remote)
    }
}
