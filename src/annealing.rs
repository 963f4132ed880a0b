//! The simulated-annealing layout evolver.
//!
//! One [`Evolver::evolve`] call takes a valid prefix layout and a chain and
//! tries to extend the prefix with a zero-energy placement of the chain:
//!
//! - **Stage 1 (cooling):** the chain is seeded randomly, then perturbed
//!   for up to `cycles` temperature steps of `trials_per_cycle` trials.
//!   The temperature follows a geometric schedule `T_k = T0 * ratio^k`;
//!   improving moves are always accepted, worsening moves with probability
//!   `exp(-dE / T_k)`. A cycle with no accepted move repeats its
//!   temperature. Success is declared the moment total energy reaches
//!   zero.
//! - **Stage 2 (restart):** when stage 1 exhausts its budget the chain is
//!   re-anchored: its *first* node is reseeded to a fresh random
//!   placement while the rest of the chain keeps its current
//!   configuration, and stage 1 reruns from there, up to
//!   `max_stage_two_failures` times. Face chains skip stage 2 entirely
//!   (inherited behavior, see DESIGN.md) and fail after their first
//!   stage-1 exhaustion.
//!
//! `max_iterations_without_success` bounds the trials between improvements
//! of the best energy seen for this chain; hitting it abandons the current
//! stage-1 run. The shared [`Budget`] is ticked before every trial, so
//! cancellation and the early-stop caps take effect within one cycle's
//! worth of work.
//!
//! Tree chains are handled greedily instead when the chain options say so:
//! deterministic first-fit placement, no PRNG draws at all.

use crate::chains::Chain;
use crate::controller::Controller;
use crate::events::{EventSink, GenerationEvent, snapshot};
use crate::layout::Layout;
use crate::stats::Budget;
use anyhow::Result;
use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tuning knobs of the annealing evolver. The defaults are the tried and
/// true values; override per generation or per chain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnealingOptions {
    /// Temperature steps per stage-1 run.
    pub cycles: u32,
    /// Perturbation trials per temperature step.
    pub trials_per_cycle: u32,
    /// Geometric cooling factor.
    pub cooling_ratio: f64,
    /// Starting temperature; `None` seeds it from the average template
    /// size.
    pub initial_temperature: Option<f64>,
    /// Trials tolerated without improving the chain's best energy before
    /// the stage-1 run is abandoned.
    pub max_iterations_without_success: u32,
    /// Stage-2 re-anchors tolerated before the chain fails for this
    /// prefix.
    pub max_stage_two_failures: u32,
}

impl Default for AnnealingOptions {
    fn default() -> Self {
        Self {
            cycles: 50,
            trials_per_cycle: 100,
            cooling_ratio: 0.9,
            initial_temperature: None,
            max_iterations_without_success: 10_000,
            max_stage_two_failures: 10_000,
        }
    }
}

/// Result of one evolver invocation.
pub(crate) enum Evolution {
    /// The chain was placed with zero energy.
    Valid(Layout),
    /// The budget or cancellation fired; carries the best layout seen
    /// (possibly invalid).
    Stopped(Layout),
    /// All stages exhausted without a valid placement.
    Failed,
}

enum StageOutcome {
    Valid,
    Stopped,
    Exhausted,
}

pub(crate) struct Evolver<'a> {
    controller: &'a Controller<'a>,
    events: &'a EventSink,
    /// Fallback initial temperature (the average template size).
    default_temperature: f64,
    /// Solve non-face chains by deterministic first-fit.
    greedy_trees: bool,
}

impl<'a> Evolver<'a> {
    pub fn new(
        controller: &'a Controller<'a>,
        events: &'a EventSink,
        default_temperature: f64,
        greedy_trees: bool,
    ) -> Self {
        Self {
            controller,
            events,
            default_temperature,
            greedy_trees,
        }
    }

    /// Try to extend `prefix` with `chain`.
    pub fn evolve<R: Rng>(
        &self,
        prefix: &Layout,
        chain: &Chain,
        options: &AnnealingOptions,
        budget: &mut Budget,
        rng: &mut R,
    ) -> Result<Evolution> {
        if self.greedy_trees && !chain.from_face {
            let mut layout = prefix.clone();
            return Ok(if self.controller.greedy_chain(&mut layout, &chain.nodes)? {
                Evolution::Valid(layout)
            } else {
                Evolution::Failed
            });
        }

        let t0 = options
            .initial_temperature
            .unwrap_or(self.default_temperature)
            .max(f64::MIN_POSITIVE);

        let mut layout = prefix.clone();
        self.controller.seed_chain(&mut layout, &chain.nodes, rng)?;
        if layout.is_valid() {
            return Ok(Evolution::Valid(layout));
        }
        let mut best = layout.clone();
        let mut failures = 0u32;

        loop {
            match self.stage_one(&mut layout, chain, options, t0, budget, rng, &mut best)? {
                StageOutcome::Valid => return Ok(Evolution::Valid(layout)),
                StageOutcome::Stopped => return Ok(Evolution::Stopped(best)),
                StageOutcome::Exhausted => {
                    if chain.from_face {
                        return Ok(Evolution::Failed);
                    }
                    failures += 1;
                    budget.chain_restarts += 1;
                    if failures >= options.max_stage_two_failures {
                        return Ok(Evolution::Failed);
                    }
                    // Re-anchor on a fresh random placement of the chain's
                    // first node; the rest of the chain evolves from where
                    // it stands.
                    self.controller
                        .seed_chain(&mut layout, &chain.nodes[..1], rng)?;
                    if layout.is_valid() {
                        return Ok(Evolution::Valid(layout));
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn stage_one<R: Rng>(
        &self,
        layout: &mut Layout,
        chain: &Chain,
        options: &AnnealingOptions,
        t0: f64,
        budget: &mut Budget,
        rng: &mut R,
        best: &mut Layout,
    ) -> Result<StageOutcome> {
        let mut temperature = t0;
        let mut cycle = 0u32;
        let mut best_energy = OrderedFloat(best.total_energy().min(layout.total_energy()));
        let mut since_improvement = 0u32;

        while cycle < options.cycles {
            let mut accepted_any = false;
            for _ in 0..options.trials_per_cycle {
                if budget.tick() {
                    return Ok(StageOutcome::Stopped);
                }
                let candidate = self.controller.perturb(layout, &chain.nodes, rng)?;
                let delta = candidate.total_energy() - layout.total_energy();
                let accepted =
                    delta <= 0.0 || rng.r#gen::<f64>() < (-delta / temperature).exp();
                if accepted {
                    *layout = candidate;
                    budget.accepted += 1;
                    accepted_any = true;
                    self.events
                        .emit(|| GenerationEvent::Perturbed(snapshot(layout)));
                    let energy = OrderedFloat(layout.total_energy());
                    if energy < best_energy {
                        best_energy = energy;
                        *best = layout.clone();
                        since_improvement = 0;
                    } else {
                        since_improvement += 1;
                    }
                    if layout.is_valid() {
                        return Ok(StageOutcome::Valid);
                    }
                } else {
                    since_improvement += 1;
                }
                if since_improvement >= options.max_iterations_without_success {
                    return Ok(StageOutcome::Exhausted);
                }
            }
            // A silent cycle repeats its temperature instead of cooling
            // further.
            if accepted_any {
                cycle += 1;
                temperature *= options.cooling_ratio;
            }
        }
        Ok(StageOutcome::Exhausted)
    }
}
