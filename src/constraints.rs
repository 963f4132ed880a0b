//! The constraint and energy model.
//!
//! Constraints are the arbiters of layout quality: each one contributes a
//! non-negative energy term per node, the terms land in dedicated slots of
//! the node's [`EnergyBlock`](crate::layout::EnergyBlock), and a layout is
//! valid exactly when every slot of every placed node is zero.
//!
//! Every constraint supports two operations:
//!
//! - **compute**: the node's full contribution against the current layout,
//!   from scratch. Pure; never mutates the layout.
//! - **update**: the incremental form used after a perturbation. All three
//!   constraints decompose into sums of pairwise terms, so a neighbor whose
//!   own configuration is unchanged just swaps the term against the moved
//!   node's old configuration for the term against its new one.
//!
//! Every pairwise term is an integer value carried in an `f64` (areas,
//! Manhattan gaps, Chebyshev shortfalls), so the incremental adds and
//! subtracts are exact and incremental blocks never drift from their
//! from-scratch counterparts.
//!
//! The set is a tagged variant ([`Constraint`]) rather than a trait object:
//! the slots of the energy block are part of the model, so the dispatch
//! sites name them explicitly.

pub mod corridor;
pub mod min_distance;
pub mod overlap;

use crate::cspaces::ConfigSpaces;
use crate::geometry::Point;
use crate::layout::{Configuration, EnergyBlock, Layout};
use crate::mapping::CompiledLevel;
use crate::templates::TemplateId;

pub(crate) use corridor::CorridorConstraint;
pub(crate) use min_distance::MinDistanceConstraint;
pub(crate) use overlap::OverlapConstraint;

/// Everything a constraint may consult: the immutable level and the
/// precomputed configuration spaces.
#[derive(Clone, Copy)]
pub(crate) struct EvalContext<'a> {
    pub level: &'a CompiledLevel,
    pub spaces: &'a ConfigSpaces,
}

/// A candidate placement of one node, before it carries an energy block.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Candidate {
    pub node: usize,
    pub template: TemplateId,
    pub position: Point,
}

impl Candidate {
    pub fn of(node: usize, template: TemplateId, position: Point) -> Self {
        Self {
            node,
            template,
            position,
        }
    }

    pub(crate) fn from_config(node: usize, config: &Configuration) -> Self {
        Self {
            node,
            template: config.template,
            position: config.position,
        }
    }
}

/// One active constraint.
pub(crate) enum Constraint {
    Overlap(OverlapConstraint),
    Corridor(CorridorConstraint),
    MinDistance(MinDistanceConstraint),
}

/// The active constraints of one generation run.
pub(crate) struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    /// Assemble the set a level needs: overlap always, the corridor
    /// constraint when the level has corridors, the distance constraint
    /// when a positive minimum distance is configured.
    pub fn for_level(
        level: &CompiledLevel,
        spaces: &ConfigSpaces,
        optimize_corridor_constraints: bool,
    ) -> Self {
        let mut constraints = vec![Constraint::Overlap(OverlapConstraint::new(
            spaces.average_size(),
            optimize_corridor_constraints,
        ))];
        if !level.corridor_of_edge.is_empty() {
            constraints.push(Constraint::Corridor(CorridorConstraint));
        }
        if level.min_distance > 0 {
            constraints.push(Constraint::MinDistance(MinDistanceConstraint::new(
                level.min_distance,
            )));
        }
        Self { constraints }
    }

    /// Full energy block of `candidate` against `layout`, from scratch.
    pub fn compute(&self, ctx: EvalContext<'_>, layout: &Layout, candidate: Candidate) -> EnergyBlock {
        let mut block = EnergyBlock::default();
        for constraint in &self.constraints {
            match constraint {
                Constraint::Overlap(c) => {
                    block.overlap = c.compute(ctx, layout, candidate);
                }
                Constraint::Corridor(c) => {
                    block.corridor_gap = c.compute(ctx, layout, candidate);
                }
                Constraint::MinDistance(c) => {
                    block.distance_gap = c.compute(ctx, layout, candidate);
                }
            }
        }
        block.energy = block.overlap + block.corridor_gap + block.distance_gap;
        block
    }

    /// Incremental re-evaluation of `node` (unchanged itself) after a
    /// previously unplaced node appeared: its pair terms are simply added.
    pub fn extend(
        &self,
        ctx: EvalContext<'_>,
        node: Candidate,
        old_block: &EnergyBlock,
        placed: Candidate,
    ) -> EnergyBlock {
        debug_assert_ne!(node.node, placed.node);
        let mut block = *old_block;
        for constraint in &self.constraints {
            match constraint {
                Constraint::Overlap(c) => {
                    block.overlap += c.pair_term(ctx, node, placed);
                }
                Constraint::Corridor(c) => {
                    block.corridor_gap += c.pair_term(ctx, node, placed);
                }
                Constraint::MinDistance(c) => {
                    block.distance_gap += c.pair_term(ctx, node, placed);
                }
            }
        }
        block.energy = block.overlap + block.corridor_gap + block.distance_gap;
        block
    }

    /// Incremental re-evaluation of `node` (unchanged itself) after the
    /// `moved` node went from `old_moved` to `new_moved`.
    pub fn update(
        &self,
        ctx: EvalContext<'_>,
        node: Candidate,
        old_block: &EnergyBlock,
        old_moved: Candidate,
        new_moved: Candidate,
    ) -> EnergyBlock {
        debug_assert_eq!(old_moved.node, new_moved.node);
        debug_assert_ne!(node.node, old_moved.node);
        let mut block = *old_block;
        for constraint in &self.constraints {
            match constraint {
                Constraint::Overlap(c) => {
                    block.overlap = block.overlap - c.pair_term(ctx, node, old_moved)
                        + c.pair_term(ctx, node, new_moved);
                }
                Constraint::Corridor(c) => {
                    block.corridor_gap = block.corridor_gap - c.pair_term(ctx, node, old_moved)
                        + c.pair_term(ctx, node, new_moved);
                }
                Constraint::MinDistance(c) => {
                    block.distance_gap = block.distance_gap - c.pair_term(ctx, node, old_moved)
                        + c.pair_term(ctx, node, new_moved);
                }
            }
        }
        block.energy = block.overlap + block.corridor_gap + block.distance_gap;
        debug_assert!(
            block.energy >= 0.0,
            "negative energy after incremental update on node {}",
            node.node
        );
        block
    }
}
