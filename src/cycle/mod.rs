//! Edit-cycle coordinator.
//!
//! One cycle takes an exercise from GitLab through a Jupyter session and
//! back. Stages run strictly in order and the first failure ends the cycle.
//! Download, session and upload run inside an interrupt-deferring region,
//! so Ctrl-C there takes effect only once the upload has finished.
//!
//! Two cycles on the same exercise must not overlap; each one is completed
//! in a single invocation.

pub mod preflight;
pub mod session;

use std::fmt;

use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::FranklinError;
use crate::picker;
use crate::sync;

/// Progress of an edit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    /// Nothing done yet.
    Idle,
    /// GitLab answers over ssh.
    ConnectivityChecked,
    /// git, the runtime and the git identity are in place.
    EnvironmentChecked,
    /// Enough free disk space.
    DiskChecked,
    /// The container runtime answers.
    RuntimeStarted,
    /// The exercise is on disk.
    Downloaded,
    /// The user finished working in Jupyter.
    SessionLaunched,
    /// Work is pushed (and the checkout pruned if configured).
    Uploaded,
    /// The cycle is complete.
    Terminal,
}

impl CycleStage {
    /// The only stage this one may advance to.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Some(match self {
            Self::Idle => Self::ConnectivityChecked,
            Self::ConnectivityChecked => Self::EnvironmentChecked,
            Self::EnvironmentChecked => Self::DiskChecked,
            Self::DiskChecked => Self::RuntimeStarted,
            Self::RuntimeStarted => Self::Downloaded,
            Self::Downloaded => Self::SessionLaunched,
            Self::SessionLaunched => Self::Uploaded,
            Self::Uploaded => Self::Terminal,
            Self::Terminal => return None,
        })
    }
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Runs the edit cycle for one exercise.
pub struct EditCycle<'a> {
    ctx: &'a ServiceContext,
    config: &'a Config,
    stage: CycleStage,
}

impl<'a> EditCycle<'a> {
    /// A cycle in the [`CycleStage::Idle`] stage.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, config: &'a Config) -> Self {
        Self { ctx, config, stage: CycleStage::Idle }
    }

    /// Stage reached so far.
    #[must_use]
    pub fn stage(&self) -> CycleStage {
        self.stage
    }

    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            info!(stage = %next, "edit cycle advanced");
            self.stage = next;
        }
    }

    /// Runs every stage. Missing course or exercise names are picked from
    /// the registry after the runtime is up.
    ///
    /// # Errors
    ///
    /// Returns the error of the stage that failed; [`stage`](Self::stage)
    /// tells how far the cycle got. An interrupt received during download,
    /// session or upload is returned as [`FranklinError::Interrupted`]
    /// after the upload.
    pub fn run(&mut self, course: Option<&str>, exercise: Option<&str>) -> Result<(), FranklinError> {
        let span = info_span!("edit_cycle", id = %Uuid::new_v4());
        let _entered = span.enter();

        let result = self.run_stages(course, exercise);
        if let Err(e) = &result {
            error!(stage = %self.stage, "edit cycle aborted: {e}");
        }
        result
    }

    fn run_stages(
        &mut self,
        course: Option<&str>,
        exercise: Option<&str>,
    ) -> Result<(), FranklinError> {
        let runner = self.ctx.runner();
        preflight::check_connectivity(&runner, self.config)?;
        self.advance();
        preflight::check_environment(self.ctx, self.config)?;
        self.advance();
        preflight::check_disk(&runner, self.config)?;
        self.advance();
        preflight::ensure_runtime(&runner, self.config)?;
        self.advance();

        let (course, exercise) = picker::choose(self.ctx, course, exercise)?;

        let guard = self.ctx.interrupts.defer();
        let outcome = self.sync_and_edit(&course, &exercise);
        settle(outcome, guard.finish())?;
        self.advance();
        Ok(())
    }

    fn sync_and_edit(&mut self, course: &str, exercise: &str) -> Result<(), FranklinError> {
        let download = sync::down(self.ctx, self.config, course, exercise)?;
        if download.result.conflict {
            return Err(FranklinError::MergeConflict { path: download.path });
        }
        self.advance();

        session::launch(self.ctx, self.config, &download.image, &download.path)?;
        self.advance();

        sync::up(self.ctx, self.config, &download.path, self.config.prune_after_upload)?;
        self.advance();
        Ok(())
    }
}

/// Combines the result of a guarded region with the interrupt delivered
/// when it ended. A pending interrupt wins so Ctrl-C always exits with 130.
fn settle(
    outcome: Result<(), FranklinError>,
    delivered: Result<(), FranklinError>,
) -> Result<(), FranklinError> {
    match (outcome, delivered) {
        (Err(e), Err(interrupt)) => {
            warn!(error = %e, "{interrupt} while the exercise was being synced");
            Err(interrupt)
        }
        (outcome, delivered) => delivered.and(outcome),
    }
}
