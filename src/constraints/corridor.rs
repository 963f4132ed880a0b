//! The corridor feasibility constraint.
//!
//! Corridor rooms are never placed by the evolver; what the evolver must
//! guarantee is that when two rooms are joined through a corridor, their
//! relative offset can be bridged by at least one allowed corridor
//! template. The precomputed through-corridor space of the contracted edge
//! is exactly the set of bridgeable offsets, so the term is the Manhattan
//! gap from the actual offset to the nearest point of that space -- zero
//! when a corridor placement exists, and growing smoothly with the
//! violation so the evolver has a gradient to follow.

use super::{Candidate, EvalContext};
use crate::layout::Layout;

/// Energy charged when no corridor template can bridge the pair at all
/// (empty through space). Large enough to dominate any realistic gap.
const UNBRIDGEABLE: f64 = 1_000_000_000.0;

pub(crate) struct CorridorConstraint;

impl CorridorConstraint {
    /// Summed gaps of `candidate` against its placed corridor partners.
    pub fn compute(&self, ctx: EvalContext<'_>, layout: &Layout, candidate: Candidate) -> f64 {
        layout
            .placed()
            .filter(|&(v, _)| v != candidate.node)
            .map(|(v, config)| self.pair_term(ctx, candidate, Candidate::from_config(v, config)))
            .sum()
    }

    /// Gap term for one ordered pair; nonzero only for corridor-contracted
    /// edges.
    pub fn pair_term(&self, ctx: EvalContext<'_>, node: Candidate, other: Candidate) -> f64 {
        if ctx.level.corridor_between(node.node, other.node).is_none() {
            return 0.0;
        }
        let space = ctx.spaces.between(
            ctx.level,
            other.node,
            node.node,
            other.template,
            node.template,
        );
        let offset = node.position - other.position;
        match space.l1_gap(offset) {
            Some(gap) => gap as f64,
            None => UNBRIDGEABLE,
        }
    }
}
