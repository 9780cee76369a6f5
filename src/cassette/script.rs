//! Hand-written cassettes.
//!
//! A [`Script`] lists the interactions a workflow is expected to have, in
//! order, and turns them into a replaying [`ServiceContext`]. Shell commands
//! and opened URLs must then be requested exactly as scripted; anything
//! unscripted panics, and [`ServiceContext::unplayed`] reports what was
//! scripted but never requested.

use std::path::Path;

use chrono::Utc;
use serde_json::{json, Value};

use super::format::{Cassette, Interaction};
use crate::context::ServiceContext;
use crate::exercise::RemoteExercise;
use crate::ports::{Course, ExerciseListing};

/// Builder for an in-memory cassette.
#[derive(Debug, Clone, Default)]
pub struct Script {
    interactions: Vec<Interaction>,
}

impl Script {
    /// Starts an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, port: &str, method: &str, input: Value, output: Value) -> Self {
        let seq = self.interactions.len() as u64;
        self.interactions.push(Interaction {
            seq,
            port: port.into(),
            method: method.into(),
            input,
            output,
        });
        self
    }

    /// A captured shell command with its exit code and output.
    #[must_use]
    pub fn shell(self, command: &str, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        self.push(
            "shell",
            "run",
            json!({ "command": command }),
            json!({"Ok": {"exit_code": exit_code, "stdout": stdout, "stderr": stderr}}),
        )
    }

    /// A captured shell command that succeeds silently.
    #[must_use]
    pub fn ok(self, command: &str) -> Self {
        self.shell(command, 0, "", "")
    }

    /// A `git -C <repo> <args>` command, quoted as the runner quotes it.
    #[must_use]
    pub fn git(self, repo: &Path, args: &str, exit_code: i32, stdout: &str) -> Self {
        let command = git_command(repo, args);
        self.shell(&command, exit_code, stdout, "")
    }

    /// A `git -C <repo> <args>` command that succeeds silently.
    #[must_use]
    pub fn git_ok(self, repo: &Path, args: &str) -> Self {
        self.git(repo, args, 0, "")
    }

    /// An interactive shell command and its exit code.
    #[must_use]
    pub fn interactive(self, command: &str, exit_code: i32) -> Self {
        self.push("shell", "run_interactive", json!({ "command": command }), json!({"Ok": exit_code}))
    }

    /// The user's answer to a yes/no question.
    #[must_use]
    pub fn confirm(self, answer: bool) -> Self {
        self.push("prompt", "confirm", json!({}), json!({"Ok": answer}))
    }

    /// The user's answer to a text question.
    #[must_use]
    pub fn input(self, answer: &str) -> Self {
        self.push("prompt", "input", json!({}), json!({"Ok": answer}))
    }

    /// The index the user picks from a list.
    #[must_use]
    pub fn select(self, index: usize) -> Self {
        self.push("prompt", "select", json!({}), json!({"Ok": index}))
    }

    /// The user pressing Enter.
    #[must_use]
    pub fn pause(self) -> Self {
        self.push("prompt", "pause", json!({}), json!({"Ok": null}))
    }

    /// A URL opened in the browser.
    #[must_use]
    pub fn open_url(self, url: &str) -> Self {
        self.push("desktop", "open_url", json!({ "url": url }), json!({"Ok": null}))
    }

    /// A clipboard write, succeeding or failing with `error`.
    #[must_use]
    pub fn clipboard(self, error: Option<&str>) -> Self {
        let output = match error {
            Some(msg) => json!({ "Err": msg }),
            None => json!({"Ok": null}),
        };
        self.push("desktop", "copy_to_clipboard", json!({}), output)
    }

    /// The registry's course list.
    #[must_use]
    pub fn courses(self, courses: &[Course]) -> Self {
        self.push("registry", "courses", json!({}), json!({ "Ok": courses }))
    }

    /// The registry's exercise list for the next course asked about.
    #[must_use]
    pub fn exercises(self, exercises: &[ExerciseListing]) -> Self {
        self.push("registry", "exercises", json!({}), json!({ "Ok": exercises }))
    }

    /// The registry resolving an exercise.
    #[must_use]
    pub fn resolve(self, remote: &RemoteExercise) -> Self {
        self.push(
            "registry",
            "resolve",
            json!({"course": remote.course, "exercise": remote.name}),
            json!({ "Ok": remote }),
        )
    }

    /// The scripted interactions as a cassette.
    #[must_use]
    pub fn cassette(&self) -> Cassette {
        Cassette {
            name: "script".into(),
            recorded_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").into(),
            interactions: self.interactions.clone(),
        }
    }

    /// A replaying context serving this script with POSIX quoting.
    #[must_use]
    pub fn context(&self) -> ServiceContext {
        ServiceContext::from_cassette(&self.cassette())
    }
}

/// The command line the runner builds for `git -C <repo> <args>` on POSIX.
#[must_use]
pub fn git_command(repo: &Path, args: &str) -> String {
    format!("git -C {} {args}", shell_words::quote(&repo.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_numbers_interactions_in_order() {
        let cassette = Script::new().ok("git fetch").confirm(true).pause().cassette();
        let seqs: Vec<u64> = cassette.interactions.iter().map(|i| i.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(cassette.interactions[1].port, "prompt");
    }

    #[test]
    fn git_commands_quote_the_repository() {
        assert_eq!(
            git_command(Path::new("/home/me/my week1"), "fetch"),
            "git -C '/home/me/my week1' fetch"
        );
    }

    #[test]
    fn context_reports_unplayed_interactions() {
        let ctx = Script::new().ok("git fetch").ok("git push").context();
        ctx.shell.run("git fetch").unwrap();
        assert_eq!(ctx.unplayed(), 1);
    }
}
