//! Run statistics and the shared iteration budget.
//!
//! [`GenerationStats`] is the caller-facing summary returned with every
//! report. [`Budget`] is the internal counterpart the evolver ticks once
//! per perturbation trial; it also owns the three stop signals -- the
//! optional iteration cap (checked every trial), the optional wall-clock
//! cap (checked every 100 trials), and the cooperative cancellation flag
//! (polled every trial). Once any of them fires the budget stays stopped.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Summary of one generation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Wall time from the first precomputation to the returned report.
    pub elapsed: Duration,
    /// Perturbation trials performed.
    pub iterations: u64,
    /// Accepted perturbations.
    pub accepted: u64,
    /// Stage-2 restarts: fresh reseeds of a chain's first node.
    pub chain_restarts: u64,
    /// Planner nodes discarded after exhausting their expansion budget.
    pub backtracks: u64,
}

pub(crate) struct Budget {
    started: Instant,
    max_iterations: Option<u64>,
    max_duration: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
    stopped: bool,
    pub iterations: u64,
    pub accepted: u64,
    pub chain_restarts: u64,
    pub backtracks: u64,
}

impl Budget {
    pub fn new(
        max_iterations: Option<u64>,
        max_duration: Option<Duration>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            started: Instant::now(),
            max_iterations,
            max_duration,
            cancel,
            stopped: false,
            iterations: 0,
            accepted: 0,
            chain_restarts: 0,
            backtracks: 0,
        }
    }

    /// Account one perturbation trial. Returns `true` when the run must
    /// unwind with its best-so-far layout.
    pub fn tick(&mut self) -> bool {
        self.iterations += 1;
        if self.stopped {
            return true;
        }
        if let Some(max) = self.max_iterations
            && self.iterations >= max
        {
            self.stopped = true;
        }
        if self.iterations % 100 == 0
            && let Some(max) = self.max_duration
            && self.started.elapsed() >= max
        {
            self.stopped = true;
        }
        if let Some(cancel) = &self.cancel
            && cancel.load(Ordering::Relaxed)
        {
            self.stopped = true;
        }
        self.stopped
    }

    pub fn stats(&self) -> GenerationStats {
        GenerationStats {
            elapsed: self.started.elapsed(),
            iterations: self.iterations,
            accepted: self.accepted,
            chain_restarts: self.chain_restarts,
            backtracks: self.backtracks,
        }
    }
}
