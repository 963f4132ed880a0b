//! The generator planner: chain-by-chain placement with bounded
//! backtracking.
//!
//! The planner maintains a stack of [`PlannerNode`]s, each a layout prefix
//! covering chains `0..k`. The top of the stack is expanded by invoking the
//! evolver on chain `k`; a success pushes a node for chain `k + 1`, a
//! failure just burns one of the prefix's expansions. A prefix that has
//! been expanded `max_branching` times without leading to a complete
//! layout is discarded and the search backtracks to its ancestor. The run
//! succeeds when a prefix covers every chain, and fails when the stack
//! empties.
//!
//! The planner draws no randomness of its own; given the injected PRNG
//! stream, the same prefix always produces the same candidate.

use crate::annealing::{AnnealingOptions, Evolution, Evolver};
use crate::chains::Chain;
use crate::events::{EventSink, GenerationEvent, snapshot};
use crate::layout::Layout;
use crate::stats::Budget;
use anyhow::Result;
use rand::Rng;

/// A layout prefix on the planner stack.
struct PlannerNode {
    layout: Layout,
    /// Index of the next chain to place.
    chain_index: usize,
    /// Evolver invocations consumed by this prefix.
    expansions: u32,
}

/// Result of a planner run.
pub(crate) enum PlanOutcome {
    /// Every chain placed, layout valid.
    Complete(Layout),
    /// The budget or cancellation fired mid-search; carries the best
    /// partial layout (possibly invalid).
    Stopped(Layout),
    /// The search space was exhausted.
    Exhausted,
}

pub(crate) struct Planner<'a> {
    evolver: &'a Evolver<'a>,
    chains: &'a [Chain],
    /// Annealing options resolved per chain (global defaults plus
    /// overrides).
    chain_options: &'a [AnnealingOptions],
    max_branching: u32,
    events: &'a EventSink,
}

impl<'a> Planner<'a> {
    pub fn new(
        evolver: &'a Evolver<'a>,
        chains: &'a [Chain],
        chain_options: &'a [AnnealingOptions],
        max_branching: u32,
        events: &'a EventSink,
    ) -> Self {
        debug_assert_eq!(chains.len(), chain_options.len());
        Self {
            evolver,
            chains,
            chain_options,
            max_branching: max_branching.max(1),
            events,
        }
    }

    /// Run the search over a level with `node_count` nodes.
    pub fn plan<R: Rng>(
        &self,
        node_count: usize,
        budget: &mut Budget,
        rng: &mut R,
    ) -> Result<PlanOutcome> {
        let mut stack = vec![PlannerNode {
            layout: Layout::empty(node_count),
            chain_index: 0,
            expansions: 0,
        }];

        loop {
            let Some(top) = stack.last_mut() else {
                return Ok(PlanOutcome::Exhausted);
            };
            if top.chain_index == self.chains.len() {
                debug_assert!(top.layout.is_valid(), "planner finished with energy > 0");
                return Ok(PlanOutcome::Complete(top.layout.clone()));
            }
            if top.expansions >= self.max_branching {
                stack.pop();
                budget.backtracks += 1;
                continue;
            }
            top.expansions += 1;

            let chain_index = top.chain_index;
            let prefix = top.layout.clone();
            let chain = &self.chains[chain_index];
            let options = &self.chain_options[chain_index];

            match self.evolver.evolve(&prefix, chain, options, budget, rng)? {
                Evolution::Valid(layout) => {
                    self.events
                        .emit(|| GenerationEvent::PartialValid(snapshot(&layout)));
                    stack.push(PlannerNode {
                        layout,
                        chain_index: chain_index + 1,
                        expansions: 0,
                    });
                }
                Evolution::Stopped(best) => return Ok(PlanOutcome::Stopped(best)),
                Evolution::Failed => {
                    // The expansion is spent; the loop retries this prefix
                    // until its branching budget runs out.
                }
            }
        }
    }
}
