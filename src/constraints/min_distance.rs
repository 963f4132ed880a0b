//! The minimum room distance constraint.
//!
//! With a positive threshold `d`, every pair of placed rooms that is not
//! adjacent in the rooms graph must keep a Chebyshev distance of at least
//! `d`. The term is the shortfall, so crowded placements pay in proportion
//! to how far they are from legal.

use super::{Candidate, EvalContext};
use crate::layout::Layout;

pub(crate) struct MinDistanceConstraint {
    distance: i32,
}

impl MinDistanceConstraint {
    pub fn new(distance: i32) -> Self {
        Self { distance }
    }

    /// Summed shortfalls of `candidate` against every other placed room.
    pub fn compute(&self, ctx: EvalContext<'_>, layout: &Layout, candidate: Candidate) -> f64 {
        layout
            .placed()
            .filter(|&(v, _)| v != candidate.node)
            .map(|(v, config)| self.pair_term(ctx, candidate, Candidate::from_config(v, config)))
            .sum()
    }

    /// Shortfall term for one ordered pair. Adjacent rooms (including pairs
    /// joined through a corridor) are exempt -- they have to touch.
    pub fn pair_term(&self, ctx: EvalContext<'_>, node: Candidate, other: Candidate) -> f64 {
        if ctx.level.corridor[node.node] || ctx.level.corridor[other.node] {
            return 0.0;
        }
        if ctx.level.rooms_graph.has_edge(node.node, other.node) {
            return 0.0;
        }
        let lib = &ctx.level.library;
        let dist = lib.outline(node.template).chebyshev_distance_at(
            node.position,
            lib.outline(other.template),
            other.position,
        );
        (self.distance - dist).max(0) as f64
    }
}
