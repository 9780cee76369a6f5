//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::adapters::live::{
    GitLabRegistry, ListingRegistry, LiveDesktop, LiveShellExecutor, TerminalPrompter,
};
use crate::adapters::recording::{
    RecordingDesktop, RecordingPrompter, RecordingRegistry, RecordingShellExecutor,
};
use crate::adapters::replaying::{
    ReplayingDesktop, ReplayingPrompter, ReplayingRegistry, ReplayingShellExecutor,
    SharedReplayer,
};
use crate::cassette::format::Cassette;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::config::Config;
use crate::error::FranklinError;
use crate::exercise::ExerciseNaming;
use crate::interrupt::InterruptGate;
use crate::ports::{Desktop, ExerciseRegistry, Prompter, ShellExecutor};
use crate::runner::{CommandRunner, Platform};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, recording, replaying).
pub struct ServiceContext {
    /// Shell executor for git, ssh and the container runtime.
    pub shell: Box<dyn ShellExecutor>,
    /// Questions put to the user.
    pub prompt: Box<dyn Prompter>,
    /// Course and exercise listing.
    pub registry: Box<dyn ExerciseRegistry>,
    /// Browser and clipboard.
    pub desktop: Box<dyn Desktop>,
    /// Shell dialect commands are quoted for.
    pub platform: Platform,
    /// Ctrl-C deferral for guarded regions.
    pub interrupts: Arc<InterruptGate>,
    replayer: Option<SharedReplayer>,
}

impl ServiceContext {
    /// Creates a live context talking to the real shell, terminal, registry
    /// and desktop.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be set up.
    pub fn live(config: &Config) -> Result<Self, FranklinError> {
        Ok(Self {
            shell: Box::new(LiveShellExecutor),
            prompt: Box::new(TerminalPrompter::stdio()),
            registry: live_registry(config)?,
            desktop: Box::new(LiveDesktop),
            platform: Platform::current(),
            interrupts: InterruptGate::process(),
            replayer: None,
        })
    }

    /// Creates a live context whose interactions are captured by `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be set up.
    pub fn recording(config: &Config, session: &RecordingSession) -> Result<Self, FranklinError> {
        let recorder = &session.recorder;
        Ok(Self {
            shell: Box::new(RecordingShellExecutor::new(
                Box::new(LiveShellExecutor),
                Arc::clone(recorder),
            )),
            prompt: Box::new(RecordingPrompter::new(
                Box::new(TerminalPrompter::stdio()),
                Arc::clone(recorder),
            )),
            registry: Box::new(RecordingRegistry::new(live_registry(config)?, Arc::clone(recorder))),
            desktop: Box::new(RecordingDesktop::new(Box::new(LiveDesktop), Arc::clone(recorder))),
            platform: Platform::current(),
            interrupts: InterruptGate::process(),
            replayer: None,
        })
    }

    /// Creates a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, FranklinError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FranklinError::Config(format!("Failed to read cassette file {}: {e}", path.display()))
        })?;
        let cassette: Cassette = serde_yaml::from_str(&content).map_err(|e| {
            FranklinError::Config(format!("Failed to parse cassette file {}: {e}", path.display()))
        })?;
        let mut ctx = Self::from_cassette(&cassette);
        ctx.interrupts = InterruptGate::process();
        Ok(ctx)
    }

    /// Creates a replaying context serving `cassette`.
    ///
    /// All ports share one replayer. Commands are quoted POSIX-style, as
    /// cassettes are written that way.
    #[must_use]
    pub fn from_cassette(cassette: &Cassette) -> Self {
        let replayer: SharedReplayer = Arc::new(Mutex::new(CassetteReplayer::new(cassette)));
        Self {
            shell: Box::new(ReplayingShellExecutor::new(Arc::clone(&replayer))),
            prompt: Box::new(ReplayingPrompter::new(Arc::clone(&replayer))),
            registry: Box::new(ReplayingRegistry::new(Arc::clone(&replayer))),
            desktop: Box::new(ReplayingDesktop::new(Arc::clone(&replayer))),
            platform: Platform::Posix,
            interrupts: Arc::new(InterruptGate::new()),
            replayer: Some(replayer),
        }
    }

    /// A command runner over this context's shell.
    #[must_use]
    pub fn runner(&self) -> CommandRunner<'_> {
        CommandRunner::new(self.shell.as_ref(), self.platform)
    }

    /// Number of replayed interactions not yet requested; zero when live.
    ///
    /// # Panics
    ///
    /// Panics if the replayer lock was poisoned.
    #[must_use]
    pub fn unplayed(&self) -> usize {
        self.replayer
            .as_ref()
            .map_or(0, |r| r.lock().expect("replayer lock poisoned").remaining())
    }
}

fn live_registry(config: &Config) -> Result<Box<dyn ExerciseRegistry>, FranklinError> {
    let naming = ExerciseNaming::from_config(config);
    Ok(match &config.registry_listing {
        Some(path) => Box::new(ListingRegistry::from_file(path, naming)?),
        None => Box::new(GitLabRegistry::new(&config.gitlab_domain, &config.gitlab_group, naming)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::script::Script;

    #[test]
    fn replaying_context_reads_cassette_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.cassette.yaml");
        let cassette = Script::new().shell("git --version", 0, "git version 2.45.0\n", "").cassette();
        std::fs::write(&path, serde_yaml::to_string(&cassette).unwrap()).unwrap();

        let ctx = ServiceContext::replaying(&path).unwrap();
        let out = ctx.shell.run("git --version").unwrap();
        assert_eq!(out.stdout.trim(), "git version 2.45.0");
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn missing_cassette_file_is_a_config_error() {
        let err = ServiceContext::replaying(Path::new("/nonexistent/x.cassette.yaml"));
        assert!(matches!(err, Err(FranklinError::Config(_))));
    }

    #[test]
    fn live_context_uses_listing_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let listing = dir.path().join("listing.yaml");
        std::fs::write(&listing, "courses:\n  - name: mbg\n").unwrap();
        let config = Config { registry_listing: Some(listing), ..Config::default() };
        let ctx = ServiceContext::live(&config).unwrap();
        assert_eq!(ctx.registry.courses().unwrap()[0].name, "mbg");
        assert_eq!(ctx.unplayed(), 0);
    }
}
