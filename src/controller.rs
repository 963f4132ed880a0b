//! The layout controller: single perturbation steps over a partial layout.
//!
//! The evolver never edits layouts directly; it asks the controller for one
//! of two perturbation kinds, chosen with fixed probability:
//!
//! - **shape** (p = 0.4): re-template a random node of the current chain,
//!   keeping its offset when the new shape still fits its placed neighbors
//!   and re-sampling an offset otherwise;
//! - **position** (p = 0.6): move a random node of the chain to a random
//!   offset from the intersection of its neighbors' configuration spaces,
//!   falling back to the union when the intersection is empty (the
//!   resulting positive energy is the evolver's problem to repair).
//!
//! After every edit the perturbed node's energy is recomputed from scratch
//! and every other placed node's cached block is updated incrementally
//! (the overlap and distance constraints couple non-neighbors, so the
//! sweep covers all placed nodes).
//!
//! PRNG draws per perturbation happen in a fixed order: kind coin, node
//! pick, shape pick (shape kind only), offset pick. Reproducing the injected
//! stream reproduces the perturbation exactly.

use crate::constraints::{Candidate, ConstraintSet, EvalContext};
use crate::cspaces::{ConfigurationSpace, intersect_shifted, union_shifted};
use crate::geometry::Point;
use crate::layout::{Configuration, Layout};
use crate::templates::TemplateId;
use anyhow::{Result, bail};
use rand::Rng;
use std::collections::HashSet;

pub(crate) struct Controller<'a> {
    ctx: EvalContext<'a>,
    constraints: &'a ConstraintSet,
    strict_repeat: bool,
}

impl<'a> Controller<'a> {
    pub fn new(ctx: EvalContext<'a>, constraints: &'a ConstraintSet, strict_repeat: bool) -> Self {
        Self {
            ctx,
            constraints,
            strict_repeat,
        }
    }

    /// Clone the layout and apply one random perturbation to a node of
    /// `chain`.
    pub fn perturb<R: Rng>(
        &self,
        layout: &Layout,
        chain: &[usize],
        rng: &mut R,
    ) -> Result<Layout> {
        let mut out = layout.clone();
        if rng.r#gen::<f64>() < 0.4 {
            self.perturb_shape(&mut out, chain, rng)?;
        } else {
            self.perturb_position(&mut out, chain, rng);
        }
        Ok(out)
    }

    fn perturb_shape<R: Rng>(
        &self,
        layout: &mut Layout,
        chain: &[usize],
        rng: &mut R,
    ) -> Result<()> {
        // Only nodes with an actual alternative are eligible.
        let mut eligible: Vec<(usize, Vec<TemplateId>)> = Vec::new();
        for &node in chain {
            let current = layout.get(node).map(|c| c.template);
            let mut candidates = self.shape_candidates(layout, node)?;
            if let Some(current) = current {
                candidates.retain(|&t| t != current);
            }
            if !candidates.is_empty() {
                eligible.push((node, candidates));
            }
        }
        let Some((node, candidates)) = pick(&eligible, rng) else {
            // Nothing to re-template; degrade to a position step.
            self.perturb_position(layout, chain, rng);
            return Ok(());
        };
        let node = *node;
        let template = candidates[rng.gen_range(0..candidates.len())];

        let current = layout.get(node).expect("chain node placed").position;
        let pairs = self.neighbor_spaces(layout, node, template);
        let intersection = intersect_shifted(&pairs);
        let position = if pairs.is_empty() || intersection.contains(current) {
            current
        } else if let Some(p) = intersection.sample(rng) {
            p
        } else if let Some(p) = union_shifted(&pairs).sample(rng) {
            p
        } else {
            current
        };
        self.apply(layout, Candidate::of(node, template, position));
        Ok(())
    }

    fn perturb_position<R: Rng>(&self, layout: &mut Layout, chain: &[usize], rng: &mut R) {
        let node = chain[rng.gen_range(0..chain.len())];
        let template = layout.get(node).expect("chain node placed").template;
        let pairs = self.neighbor_spaces(layout, node, template);
        let intersection = intersect_shifted(&pairs);
        let position = if let Some(p) = intersection.sample(rng) {
            p
        } else if let Some(p) = union_shifted(&pairs).sample(rng) {
            p
        } else {
            layout.get(node).expect("chain node placed").position
        };
        self.apply(layout, Candidate::of(node, template, position));
    }

    /// Place every node of `chain` at a random admissible spot, in chain
    /// order. Seeds a fresh stage-1 attempt.
    pub fn seed_chain<R: Rng>(
        &self,
        layout: &mut Layout,
        chain: &[usize],
        rng: &mut R,
    ) -> Result<()> {
        for &node in chain {
            let candidates = self.shape_candidates(layout, node)?;
            let template = candidates[rng.gen_range(0..candidates.len())];
            let pairs = self.neighbor_spaces(layout, node, template);
            let intersection = intersect_shifted(&pairs);
            let position = if let Some(p) = intersection.sample(rng) {
                p
            } else if let Some(p) = union_shifted(&pairs).sample(rng) {
                p
            } else {
                Point::ORIGIN
            };
            self.apply(layout, Candidate::of(node, template, position));
        }
        Ok(())
    }

    /// Deterministic first-fit placement for greedily handled tree chains:
    /// for each node, the first template and offset with a zero energy
    /// block wins. Returns `false` when some node has no zero-energy spot.
    pub fn greedy_chain(&self, layout: &mut Layout, chain: &[usize]) -> Result<bool> {
        for &node in chain {
            let candidates = self.shape_candidates(layout, node)?;
            let mut placed = false;
            'templates: for template in candidates {
                let pairs = self.neighbor_spaces(layout, node, template);
                if pairs.is_empty() {
                    let candidate = Candidate::of(node, template, Point::ORIGIN);
                    if self.constraints.compute(self.ctx, layout, candidate).is_valid() {
                        self.apply(layout, candidate);
                        placed = true;
                        break 'templates;
                    }
                    continue;
                }
                let intersection = intersect_shifted(&pairs);
                for position in intersection.offsets() {
                    let candidate = Candidate::of(node, template, position);
                    if self.constraints.compute(self.ctx, layout, candidate).is_valid() {
                        self.apply(layout, candidate);
                        placed = true;
                        break 'templates;
                    }
                }
            }
            if !placed {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Allowed templates of `node` after repeat-mode filtering.
    ///
    /// When the filter empties the set, strict mode fails the generation;
    /// otherwise the unfiltered set is used (repeat preferences yield to
    /// feasibility).
    pub fn shape_candidates(&self, layout: &Layout, node: usize) -> Result<Vec<TemplateId>> {
        use crate::mapping::RepeatMode;

        let level = self.ctx.level;
        let allowed = &level.templates[node];
        let banned: HashSet<usize> = match level.repeat[node] {
            RepeatMode::Allowed => HashSet::new(),
            RepeatMode::NoImmediate => level
                .rooms_graph
                .neighbors(node)
                .iter()
                .filter_map(|&u| layout.get(u))
                .map(|c| level.library.alias_of(c.template))
                .collect(),
            RepeatMode::NoRepeat => layout
                .placed()
                .filter(|&(v, _)| v != node)
                .map(|(_, c)| level.library.alias_of(c.template))
                .collect(),
        };
        let filtered: Vec<TemplateId> = allowed
            .iter()
            .copied()
            .filter(|&t| !banned.contains(&level.library.alias_of(t)))
            .collect();
        if !filtered.is_empty() {
            return Ok(filtered);
        }
        if self.strict_repeat {
            bail!(
                "repeat mode of node {node} cannot be satisfied: every allowed template \
                 repeats a placed shape"
            );
        }
        Ok(allowed.clone())
    }

    /// `(position, space)` pairs for the placed rooms-graph neighbors of
    /// `node`, with `node` wearing `template`.
    fn neighbor_spaces(
        &self,
        layout: &Layout,
        node: usize,
        template: TemplateId,
    ) -> Vec<(Point, &'a ConfigurationSpace)> {
        self.ctx
            .level
            .rooms_graph
            .neighbors(node)
            .iter()
            .filter_map(|&u| {
                layout.get(u).map(|c| {
                    let space =
                        self.ctx
                            .spaces
                            .between(self.ctx.level, u, node, c.template, template);
                    (c.position, space)
                })
            })
            .collect()
    }

    /// Install `candidate` into the layout: incrementally refresh every
    /// other placed node, then compute the candidate's own block from
    /// scratch.
    pub fn apply(&self, layout: &mut Layout, candidate: Candidate) {
        let old = layout
            .get(candidate.node)
            .map(|c| Candidate::from_config(candidate.node, c));
        let others: Vec<usize> = layout
            .placed()
            .map(|(v, _)| v)
            .filter(|&v| v != candidate.node)
            .collect();
        for v in others {
            let config = layout.get(v).expect("iterating placed nodes");
            let node = Candidate::from_config(v, config);
            let (template, position, block) = (config.template, config.position, config.energy);
            let refreshed = match old {
                Some(old) => self
                    .constraints
                    .update(self.ctx, node, &block, old, candidate),
                None => self.constraints.extend(self.ctx, node, &block, candidate),
            };
            layout.set(v, Configuration::new(template, position, refreshed));
        }
        let block = self.constraints.compute(self.ctx, layout, candidate);
        layout.set(
            candidate.node,
            Configuration::new(candidate.template, candidate.position, block),
        );
    }
}

fn pick<'e, T, R: Rng>(items: &'e [T], rng: &mut R) -> Option<&'e T> {
    if items.is_empty() {
        None
    } else {
        Some(&items[rng.gen_range(0..items.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintSet;
    use crate::cspaces::ConfigSpaces;
    use crate::doors::DefaultDoorHandler;
    use crate::mapping::{LevelDescription, compile};
    use crate::testing::{corridor_templates, cycle_level, rect_template, square_template};
    use anyhow::Result;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_caches_exact(
        controller: &Controller<'_>,
        constraints: &ConstraintSet,
        chain: &[usize],
        node_count: usize,
        seed: u64,
    ) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut layout = Layout::empty(node_count);
        controller.seed_chain(&mut layout, chain, &mut rng)?;
        for _ in 0..200 {
            layout = controller.perturb(&layout, chain, &mut rng)?;
            for (node, config) in layout.placed() {
                let scratch = constraints.compute(
                    controller.ctx,
                    &layout,
                    Candidate::from_config(node, config),
                );
                assert_eq!(
                    scratch, config.energy,
                    "cached energy of node {node} diverged from a from-scratch compute"
                );
            }
        }
        Ok(())
    }

    // The incremental `update`/`extend` path must stay bit-identical with
    // from-scratch computation; every term is integer-valued so there is
    // no tolerance to hide behind.
    #[test]
    fn incremental_energy_matches_from_scratch() -> Result<()> {
        let mut level = cycle_level(5, vec![square_template(4), rect_template(4, 6)]);
        level.set_minimum_room_distance(2);
        let compiled = compile(&level, &DefaultDoorHandler, None)?;
        let spaces = ConfigSpaces::build(&compiled);
        let constraints = ConstraintSet::for_level(&compiled, &spaces, false);
        let ctx = EvalContext {
            level: &compiled,
            spaces: &spaces,
        };
        let controller = Controller::new(ctx, &constraints, false);
        let chain: Vec<usize> = (0..5).collect();
        assert_caches_exact(&controller, &constraints, &chain, 5, 7)
    }

    #[test]
    fn incremental_energy_matches_with_corridors() -> Result<()> {
        let mut level = LevelDescription::new();
        for node in 0u32..3 {
            level.add_room(node, vec![square_template(4)])?;
        }
        level.add_corridor_room(9, corridor_templates())?;
        level.add_passage(0, 9);
        level.add_passage(9, 1);
        level.add_passage(1, 2);
        let compiled = compile(&level, &DefaultDoorHandler, None)?;
        let spaces = ConfigSpaces::build(&compiled);
        let constraints = ConstraintSet::for_level(&compiled, &spaces, false);
        let ctx = EvalContext {
            level: &compiled,
            spaces: &spaces,
        };
        let controller = Controller::new(ctx, &constraints, false);
        // Rooms only; the corridor room (index 3) is contracted away.
        let chain: Vec<usize> = vec![0, 1, 2];
        assert_caches_exact(&controller, &constraints, &chain, 4, 11)
    }
}
