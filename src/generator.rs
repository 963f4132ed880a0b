//! The top-level generator: validate, precompute, search, convert.
//!
//! [`LevelGenerator`] wires the whole pipeline together. One
//! [`generate`](LevelGenerator::generate) call:
//!
//! 1. validates the level description and the option combination,
//! 2. compiles the description to dense indices and interns the templates,
//! 3. precomputes every configuration space,
//! 4. decomposes the rooms graph into chains,
//! 5. runs the backtracking planner over the annealing evolver,
//! 6. converts the winning layout back into the caller's node type.
//!
//! The run is single-threaded and blocking (only the space precomputation
//! may fan out, behind the `parallel-precompute` feature). All randomness
//! comes from one injected PRNG: the same seed, level, and options always
//! produce the same report.
//!
//! Configuration problems surface as `Err`. In-run outcomes -- success,
//! cancellation/early stop, search exhaustion -- are the three variants of
//! [`GenerationOutcome`], so callers can always tell a failed search from
//! a broken input.

use crate::annealing::{AnnealingOptions, Evolver};
use crate::chains::{ChainOptions, decompose};
use crate::constraints::{ConstraintSet, EvalContext};
use crate::controller::Controller;
use crate::converter::{MapLayout, convert};
use crate::cspaces::ConfigSpaces;
use crate::doors::DefaultDoorHandler;
use crate::events::{EventSink, GenerationEvent, snapshot};
use crate::mapping::{LevelDescription, NodeKey, RepeatMode, compile};
use crate::planner::{PlanOutcome, Planner};
use crate::stats::{Budget, GenerationStats};
use crate::validation::ensure_valid;
use anyhow::{Result, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::Sender;
use std::time::Duration;

/// Options of one generator instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// Chain decomposition tuning.
    pub chains: ChainOptions,
    /// Annealing defaults applied to every chain.
    pub annealing: AnnealingOptions,
    /// Per-chain annealing overrides, keyed by chain index.
    pub chain_annealing_overrides: Vec<(usize, AnnealingOptions)>,
    /// Evolver invocations each planner prefix may consume.
    pub max_branching: u32,
    /// Treat corridor-joined room pairs as plain neighbors in the overlap
    /// check; by default their contact also pays the non-neighbor penalty,
    /// since the corridor needs space between them.
    pub optimize_corridor_constraints: bool,
    /// Replace every room's own repeat policy with this one.
    pub repeat_mode_override: Option<RepeatMode>,
    /// Fail the generation when a repeat policy cannot be honored instead
    /// of quietly ignoring it.
    pub strict_repeat_mode: bool,
    /// Early stop: give up after this many perturbation trials.
    pub max_iterations: Option<u64>,
    /// Early stop: give up after this much wall time (checked every 100
    /// trials).
    pub max_duration: Option<Duration>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            chains: ChainOptions::default(),
            annealing: AnnealingOptions::default(),
            chain_annealing_overrides: Vec::new(),
            max_branching: 5,
            optimize_corridor_constraints: false,
            repeat_mode_override: None,
            strict_repeat_mode: false,
            max_iterations: None,
            max_duration: None,
        }
    }
}

/// How a generation run ended.
#[derive(Clone, Debug)]
pub enum GenerationOutcome<N> {
    /// A complete valid layout.
    Complete(MapLayout<N>),
    /// Cancellation or an early-stop cap fired. The partial layout is a
    /// best-effort conversion of the best layout seen and may violate
    /// constraints.
    Cancelled { partial: Option<MapLayout<N>> },
    /// The planner exhausted its search space.
    Exhausted,
}

impl<N> GenerationOutcome<N> {
    /// The complete layout, when the run succeeded.
    pub fn layout(&self) -> Option<&MapLayout<N>> {
        match self {
            GenerationOutcome::Complete(layout) => Some(layout),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, GenerationOutcome::Complete(_))
    }
}

/// Outcome plus run statistics.
#[derive(Clone, Debug)]
pub struct GenerationReport<N> {
    pub outcome: GenerationOutcome<N>,
    pub stats: GenerationStats,
}

/// The procedural layout generator.
#[derive(Default)]
pub struct LevelGenerator {
    options: GeneratorOptions,
    events: Option<Sender<GenerationEvent>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl LevelGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            events: None,
            cancel: None,
        }
    }

    /// Subscribe a channel to progress events.
    pub fn with_event_sender(mut self, sender: Sender<GenerationEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Attach a cooperative cancellation flag, polled at every trial.
    /// Incompatible with the early-stop options.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[inline]
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate a layout with a seeded PRNG. Identical inputs and seed
    /// produce identical reports.
    pub fn generate<N: NodeKey>(
        &self,
        level: &LevelDescription<N>,
        seed: u64,
    ) -> Result<GenerationReport<N>> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.generate_with_rng(level, &mut rng)
    }

    /// Generate a layout drawing every stochastic step from `rng`.
    pub fn generate_with_rng<N: NodeKey, R: Rng>(
        &self,
        level: &LevelDescription<N>,
        rng: &mut R,
    ) -> Result<GenerationReport<N>> {
        if self.cancel.is_some()
            && (self.options.max_iterations.is_some() || self.options.max_duration.is_some())
        {
            bail!(
                "a cancellation token cannot be combined with the early-stop options; \
                 pick one mechanism"
            );
        }
        ensure_valid(level)?;

        let mut budget = Budget::new(
            self.options.max_iterations,
            self.options.max_duration,
            self.cancel.clone(),
        );

        let compiled = compile(level, &DefaultDoorHandler, self.options.repeat_mode_override)?;
        let spaces = ConfigSpaces::build(&compiled);
        let active: Vec<bool> = compiled.corridor.iter().map(|&c| !c).collect();
        let chains = decompose(&compiled.rooms_graph, &active, &self.options.chains);
        let chain_options = self.resolve_chain_options(chains.len());

        let constraints = ConstraintSet::for_level(
            &compiled,
            &spaces,
            self.options.optimize_corridor_constraints,
        );
        let ctx = EvalContext {
            level: &compiled,
            spaces: &spaces,
        };
        let events = EventSink::new(self.events.clone());
        let controller = Controller::new(ctx, &constraints, self.options.strict_repeat_mode);
        let evolver = Evolver::new(
            &controller,
            &events,
            spaces.average_size(),
            self.options.chains.greedy_trees,
        );
        let planner = Planner::new(
            &evolver,
            &chains,
            &chain_options,
            self.options.max_branching,
            &events,
        );

        let outcome = match planner.plan(compiled.node_count(), &mut budget, rng)? {
            PlanOutcome::Complete(layout) => {
                let map = convert(level, &compiled, &spaces, &layout, true)?;
                events.emit(|| GenerationEvent::Valid(snapshot(&layout)));
                GenerationOutcome::Complete(map)
            }
            PlanOutcome::Stopped(best) => {
                let partial = convert(level, &compiled, &spaces, &best, false).ok();
                GenerationOutcome::Cancelled { partial }
            }
            PlanOutcome::Exhausted => GenerationOutcome::Exhausted,
        };

        Ok(GenerationReport {
            outcome,
            stats: budget.stats(),
        })
    }

    fn resolve_chain_options(&self, chain_count: usize) -> Vec<AnnealingOptions> {
        let mut options = vec![self.options.annealing; chain_count];
        for &(index, overridden) in &self.options.chain_annealing_overrides {
            if index < chain_count {
                options[index] = overridden;
            }
        }
        options
    }
}
