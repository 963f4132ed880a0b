//! The basic overlap constraint.
//!
//! Rooms must not share interior area. Overlap with a directly adjacent
//! room is weighed by its raw area (the evolver walks it down to zero
//! along the configuration spaces); overlap with an unrelated placed room
//! additionally pays a flat penalty, so an illegal contact always
//! outweighs a crowded but legal one.
//!
//! Rooms joined *through a corridor* sit in between: they are rooms-graph
//! neighbors, but they share no door and the corridor still needs space
//! between them. By default their contact pays the non-neighbor penalty
//! too; with corridor optimization on they are treated as plain neighbors
//! and the corridor constraint alone polices the link.

use super::{Candidate, EvalContext};
use crate::layout::Layout;

pub(crate) struct OverlapConstraint {
    /// Added on top of the area for penalized overlap. An integer value
    /// (the rounded-up average template size) so incremental updates stay
    /// exact.
    nonneighbor_penalty: f64,
    /// Treat corridor-joined room pairs as plain neighbors instead of
    /// charging them the contact penalty.
    relax_corridor_pairs: bool,
}

impl OverlapConstraint {
    pub fn new(average_size: f64, relax_corridor_pairs: bool) -> Self {
        Self {
            nonneighbor_penalty: average_size.ceil().max(1.0),
            relax_corridor_pairs,
        }
    }

    /// Summed overlap terms of `candidate` against every other placed node.
    pub fn compute(&self, ctx: EvalContext<'_>, layout: &Layout, candidate: Candidate) -> f64 {
        layout
            .placed()
            .filter(|&(v, _)| v != candidate.node)
            .map(|(v, config)| self.pair_term(ctx, candidate, Candidate::from_config(v, config)))
            .sum()
    }

    /// Overlap term for one ordered pair.
    pub fn pair_term(&self, ctx: EvalContext<'_>, node: Candidate, other: Candidate) -> f64 {
        let lib = &ctx.level.library;
        let area = lib.outline(node.template).overlap_area_at(
            node.position,
            lib.outline(other.template),
            other.position,
        );
        if area == 0 {
            return 0.0;
        }
        if ctx.level.rooms_graph.has_edge(node.node, other.node) {
            let through_corridor = ctx.level.corridor_between(node.node, other.node).is_some();
            if !through_corridor || self.relax_corridor_pairs {
                return area as f64;
            }
        }
        area as f64 + self.nonneighbor_penalty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cspaces::ConfigSpaces;
    use crate::doors::DefaultDoorHandler;
    use crate::geometry::Point;
    use crate::mapping::{LevelDescription, compile};
    use crate::testing::{corridor_templates, square_template};
    use anyhow::Result;

    #[test]
    fn corridor_joined_pairs_follow_the_optimize_flag() -> Result<()> {
        let mut level = LevelDescription::new();
        level.add_room(0u32, vec![square_template(4)])?;
        level.add_room(1, vec![square_template(4)])?;
        level.add_corridor_room(2, corridor_templates())?;
        level.add_passage(0, 2);
        level.add_passage(2, 1);
        let compiled = compile(&level, &DefaultDoorHandler, None)?;
        let spaces = ConfigSpaces::build(&compiled);
        let ctx = EvalContext {
            level: &compiled,
            spaces: &spaces,
        };

        // Rooms 0 and 1 overlapping by a 2x4 strip across their corridor
        // link.
        let a = Candidate::of(0, 0, Point::ORIGIN);
        let b = Candidate::of(1, 0, Point::new(2, 0));
        let area = 8.0;

        let relaxed = OverlapConstraint::new(spaces.average_size(), true);
        assert_eq!(
            relaxed.pair_term(ctx, a, b),
            area,
            "with optimization on, a corridor pair weighs its raw area"
        );

        let strict = OverlapConstraint::new(spaces.average_size(), false);
        assert!(
            strict.pair_term(ctx, a, b) > area,
            "without optimization, the contact pays the penalty on top"
        );

        // Either way the term vanishes once the rooms separate.
        let apart = Candidate::of(1, 0, Point::new(6, 0));
        assert_eq!(strict.pair_term(ctx, a, apart), 0.0);
        assert_eq!(relaxed.pair_term(ctx, a, apart), 0.0);
        Ok(())
    }
}
