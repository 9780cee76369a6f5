//! Deferral of Ctrl-C around steps that must not be cut short.
//!
//! Outside a guarded region an interrupt ends the process with status 130.
//! Inside one, it is remembered and handed back as
//! [`FranklinError::Interrupted`] when the outermost region finishes, so a
//! half-finished download or upload is never left behind.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use crate::error::FranklinError;

/// Tracks guarded regions and interrupts that arrived inside them.
#[derive(Debug, Default)]
pub struct InterruptGate {
    depth: AtomicUsize,
    pending: AtomicBool,
}

impl InterruptGate {
    /// A gate not connected to any signal handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The gate fed by the process's Ctrl-C handler.
    ///
    /// The handler is installed on first use; failure to install it is
    /// logged and Ctrl-C keeps its default behaviour.
    #[must_use]
    pub fn process() -> Arc<Self> {
        static GATE: OnceLock<Arc<InterruptGate>> = OnceLock::new();
        Arc::clone(GATE.get_or_init(|| {
            let gate = Arc::new(Self::new());
            let handler_gate = Arc::clone(&gate);
            let installed = ctrlc::set_handler(move || {
                if handler_gate.signal() {
                    eprintln!("\nInterrupt received; finishing the current step first.");
                } else {
                    std::process::exit(130);
                }
            });
            if let Err(e) = installed {
                warn!("could not install Ctrl-C handler: {e}");
            }
            gate
        }))
    }

    /// Records an interrupt. Returns `true` if it was deferred, `false` if no
    /// guarded region is active and the caller should stop now.
    pub fn signal(&self) -> bool {
        if self.depth.load(Ordering::SeqCst) == 0 {
            return false;
        }
        self.pending.store(true, Ordering::SeqCst);
        true
    }

    /// Enters a guarded region that lasts until the guard is finished or
    /// dropped.
    #[must_use]
    pub fn defer(&self) -> DeferGuard<'_> {
        self.depth.fetch_add(1, Ordering::SeqCst);
        DeferGuard { gate: self }
    }

    /// Whether a guarded region is currently active.
    #[must_use]
    pub fn is_deferring(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }
}

/// An active guarded region.
#[must_use = "an unfinished guard swallows interrupts"]
pub struct DeferGuard<'a> {
    gate: &'a InterruptGate,
}

impl DeferGuard<'_> {
    /// Leaves the region and delivers an interrupt that arrived inside it.
    ///
    /// # Errors
    ///
    /// Returns [`FranklinError::Interrupted`] if Ctrl-C was pressed while
    /// this was the outermost active region.
    pub fn finish(self) -> Result<(), FranklinError> {
        let gate = self.gate;
        drop(self);
        if gate.depth.load(Ordering::SeqCst) == 0 && gate.pending.swap(false, Ordering::SeqCst) {
            info!("delivering deferred interrupt");
            return Err(FranklinError::Interrupted);
        }
        Ok(())
    }
}

impl Drop for DeferGuard<'_> {
    fn drop(&mut self) {
        self.gate.depth.fetch_sub(1, Ordering::SeqCst);
    }
}
