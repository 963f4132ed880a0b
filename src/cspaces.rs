//! Configuration spaces: where can one shape legally sit relative to
//! another?
//!
//! For an ordered template pair `(fixed, moving)` the configuration space
//! is the set of integer offsets `d` such that placing the moving outline
//! at `fixed_position + d` makes at least one door of each template
//! coincide while the interiors stay disjoint. Because doors slide along
//! walls, the space is a union of axis-aligned segments and is stored as
//! such ([`ConfigurationSpace`] holds [`OrthoLine`]s, not point sets).
//!
//! [`ConfigSpaces`] precomputes, once per generation:
//!
//! - the **direct** table over all ordered template pairs, and
//! - per corridor-contracted room edge, the **through-corridor** space:
//!   the Minkowski sum `CS(A, C) ⊕ CS(C, B)` unioned over the corridor's
//!   allowed templates `C`, which is exactly the set of room offsets the
//!   corridor can bridge.
//!
//! Spaces satisfy `d ∈ CS(A, B) ⇔ -d ∈ CS(B, A)`; the tests exercise this
//! for every pair.
//!
//! With the `parallel-precompute` feature (default) the direct table is
//! built on the rayon pool; the build is a pure function of the template
//! library either way.

use crate::doors::DoorHandler;
use crate::geometry::{OrthoLine, Point};
use crate::mapping::CompiledLevel;
use crate::templates::{RoomTemplate, TemplateId, TemplateLibrary};
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A set of relative offsets, stored as canonical axis-aligned segments.
///
/// Segments are sorted and exact duplicates removed; partially overlapping
/// segments from different door pairs are kept as-is, which biases random
/// sampling slightly towards offsets reachable through several door pairs.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct ConfigurationSpace {
    lines: Vec<OrthoLine>,
}

impl ConfigurationSpace {
    /// Build a space from offset segments, canonicalizing and sorting.
    pub fn from_lines(lines: Vec<OrthoLine>) -> Self {
        let mut lines: Vec<OrthoLine> = lines.iter().map(OrthoLine::canonical).collect();
        lines.sort_by_key(|l| (l.from, l.to));
        lines.dedup();
        Self { lines }
    }

    /// The empty space.
    pub const EMPTY: ConfigurationSpace = ConfigurationSpace { lines: Vec::new() };

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[inline]
    pub fn lines(&self) -> &[OrthoLine] {
        &self.lines
    }

    /// Number of lattice offsets, counting multiplicity across segments.
    pub fn offset_count(&self) -> u64 {
        self.lines.iter().map(OrthoLine::point_count).sum()
    }

    /// True if `d` lies in the space.
    pub fn contains(&self, d: Point) -> bool {
        self.lines.iter().any(|l| l.contains(d))
    }

    /// All offsets in deterministic (segment, then along-segment) order.
    pub fn offsets(&self) -> impl Iterator<Item = Point> + '_ {
        self.lines.iter().flat_map(|l| l.points())
    }

    /// Draw a uniform random offset (weighted by segment multiplicity).
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<Point> {
        let total = self.offset_count();
        if total == 0 {
            return None;
        }
        let mut pick = rng.gen_range(0..total);
        for line in &self.lines {
            let count = line.point_count();
            if pick < count {
                return Some(line.at(pick as i32));
            }
            pick -= count;
        }
        unreachable!("sample index exceeded offset count")
    }

    /// The space reflected through the origin (`CS(B, A)` from `CS(A, B)`).
    pub fn negate(&self) -> Self {
        Self::from_lines(self.lines.iter().map(OrthoLine::negate).collect())
    }

    /// The space shifted by `d` (turning relative offsets into absolute
    /// positions).
    pub fn translate(&self, d: Point) -> Self {
        Self {
            lines: self.lines.iter().map(|l| l.translate(d)).collect(),
        }
    }

    /// Set intersection.
    pub fn intersect(&self, other: &ConfigurationSpace) -> Self {
        let mut out = Vec::new();
        for a in &self.lines {
            for b in &other.lines {
                if let Some(shared) = a.intersect(b) {
                    out.push(shared);
                }
            }
        }
        Self::from_lines(out)
    }

    /// Minkowski sum: every offset of `self` composed with every offset of
    /// `other`. Perpendicular segment pairs span rectangles, which are
    /// emitted as bundles of horizontal segments.
    pub fn minkowski_sum(&self, other: &ConfigurationSpace) -> Self {
        let mut out = Vec::new();
        for a in &self.lines {
            for b in &other.lines {
                sum_segments(a, b, &mut out);
            }
        }
        Self::from_lines(out)
    }

    /// Manhattan distance from `d` to the nearest offset in the space.
    pub fn l1_gap(&self, d: Point) -> Option<i32> {
        self.lines.iter().map(|l| l.l1_distance(d)).min()
    }
}

fn sum_segments(a: &OrthoLine, b: &OrthoLine, out: &mut Vec<OrthoLine>) {
    // Points are absorbed as plain translations.
    if a.length() == 0 {
        out.push(b.translate(a.from));
        return;
    }
    if b.length() == 0 {
        out.push(a.translate(b.from));
        return;
    }
    match (a.is_horizontal(), b.is_horizontal()) {
        (true, true) | (false, false) => {
            out.push(OrthoLine::new(a.from + b.from, a.to + b.to));
        }
        (true, false) | (false, true) => {
            // A w x h rectangle of offsets, one horizontal segment per row.
            let (h, v) = if a.is_horizontal() { (a, b) } else { (b, a) };
            let lo = h.from.y.min(h.to.y) + v.from.y.min(v.to.y);
            let hi = h.from.y.max(h.to.y) + v.from.y.max(v.to.y);
            let x0 = h.from.x.min(h.to.x) + v.from.x;
            let x1 = h.from.x.max(h.to.x) + v.to.x;
            for y in lo..=hi {
                out.push(OrthoLine::new(
                    Point::new(x0.min(x1), y),
                    Point::new(x0.max(x1), y),
                ));
            }
        }
    }
}

/// Intersection of several spaces shifted to absolute positions: the valid
/// placements of one node against all of its placed partners. `pairs` holds
/// `(partner_position, space_of_node_relative_to_partner)`.
pub(crate) fn intersect_shifted(
    pairs: &[(Point, &ConfigurationSpace)],
) -> ConfigurationSpace {
    let Some(((first_pos, first), rest)) = pairs.split_first() else {
        return ConfigurationSpace::EMPTY;
    };
    let mut acc = first.translate(*first_pos);
    for (pos, space) in rest {
        acc = acc.intersect(&space.translate(*pos));
        if acc.is_empty() {
            break;
        }
    }
    acc
}

/// Union counterpart of [`intersect_shifted`], used as the fallback when the
/// intersection is empty (the evolver then has to repair the resulting
/// positive energy).
pub(crate) fn union_shifted(pairs: &[(Point, &ConfigurationSpace)]) -> ConfigurationSpace {
    let mut lines = Vec::new();
    for (pos, space) in pairs {
        lines.extend(space.translate(*pos).lines.iter().copied());
    }
    ConfigurationSpace::from_lines(lines)
}

/// Immutable table of every configuration space one generation needs.
#[derive(Clone, Debug)]
pub(crate) struct ConfigSpaces {
    /// `direct[moving][fixed]`: offsets of the moving template relative to
    /// the fixed one.
    direct: Vec<Vec<ConfigurationSpace>>,
    /// `(fixed_node, moving_node, fixed_template, moving_template)` for
    /// corridor-contracted room edges.
    through: HashMap<(usize, usize, TemplateId, TemplateId), ConfigurationSpace>,
    average_size: f64,
}

impl ConfigSpaces {
    /// Precompute all spaces for a compiled level.
    pub fn build(level: &CompiledLevel) -> Self {
        let lib = &level.library;
        let t = lib.len();

        #[cfg(feature = "parallel-precompute")]
        let direct: Vec<Vec<ConfigurationSpace>> = {
            use rayon::prelude::*;
            (0..t)
                .into_par_iter()
                .map(|moving| (0..t).map(|fixed| pair_space(lib, fixed, moving)).collect())
                .collect()
        };
        #[cfg(not(feature = "parallel-precompute"))]
        let direct: Vec<Vec<ConfigurationSpace>> = (0..t)
            .map(|moving| (0..t).map(|fixed| pair_space(lib, fixed, moving)).collect())
            .collect();

        let mut through = HashMap::new();
        for (&(a, b), &c) in &level.corridor_of_edge {
            for (fixed, moving) in [(a, b), (b, a)] {
                for &tf in &level.templates[fixed] {
                    for &tm in &level.templates[moving] {
                        let mut lines = Vec::new();
                        for &tc in &level.templates[c] {
                            // corridor rel fixed, then moving rel corridor
                            let sum = direct[tc][tf].minkowski_sum(&direct[tm][tc]);
                            lines.extend(sum.lines().iter().copied());
                        }
                        through.insert(
                            (fixed, moving, tf, tm),
                            ConfigurationSpace::from_lines(lines),
                        );
                    }
                }
            }
        }

        Self {
            direct,
            through,
            average_size: lib.average_size(),
        }
    }

    /// Offsets of `moving` relative to `fixed` for directly adjacent
    /// templates.
    #[inline]
    pub fn direct(&self, fixed: TemplateId, moving: TemplateId) -> &ConfigurationSpace {
        &self.direct[moving][fixed]
    }

    /// The space governing a rooms-graph edge: the direct space for a plain
    /// passage, the precomputed through-corridor space for a contracted
    /// corridor edge.
    pub fn between(
        &self,
        level: &CompiledLevel,
        fixed_node: usize,
        moving_node: usize,
        fixed_template: TemplateId,
        moving_template: TemplateId,
    ) -> &ConfigurationSpace {
        static EMPTY: ConfigurationSpace = ConfigurationSpace { lines: Vec::new() };
        if level.corridor_between(fixed_node, moving_node).is_some() {
            self.through
                .get(&(fixed_node, moving_node, fixed_template, moving_template))
                .unwrap_or(&EMPTY)
        } else {
            self.direct(fixed_template, moving_template)
        }
    }

    /// Mean bounding-box diagonal of the template library; the annealing
    /// temperature seed.
    #[inline]
    pub fn average_size(&self) -> f64 {
        self.average_size
    }
}

/// The configuration space of `moving` relative to `fixed`, computed
/// standalone. Useful for inspecting template compatibility outside a
/// generation run; a run precomputes the same spaces in bulk.
pub fn configuration_space_between(
    fixed: &RoomTemplate,
    moving: &RoomTemplate,
    handler: &dyn DoorHandler,
) -> Result<ConfigurationSpace> {
    let mut lib = TemplateLibrary::new();
    let f = lib.intern(fixed, handler)?;
    let m = lib.intern(moving, handler)?;
    Ok(pair_space(&lib, f, m))
}

/// Compute one direct configuration space from door-line pairs.
fn pair_space(lib: &TemplateLibrary, fixed: TemplateId, moving: TemplateId) -> ConfigurationSpace {
    let f_outline = lib.outline(fixed);
    let m_outline = lib.outline(moving);
    let mut lines = Vec::new();

    for df in lib.doors(fixed) {
        for dm in lib.doors(moving) {
            if dm.facing != df.facing.opposite() || dm.length != df.length {
                continue;
            }
            let fl = df.line.canonical();
            let ml = dm.line.canonical();
            let candidate = if df.facing.is_horizontal_wall() {
                OrthoLine::new(
                    Point::new(fl.from.x - ml.to.x, fl.from.y - ml.from.y),
                    Point::new(fl.to.x - ml.from.x, fl.from.y - ml.from.y),
                )
            } else {
                OrthoLine::new(
                    Point::new(fl.from.x - ml.from.x, fl.from.y - ml.to.y),
                    Point::new(fl.from.x - ml.from.x, fl.to.y - ml.from.y),
                )
            };
            // Drop offsets where the interiors would intersect, splitting
            // the segment into the surviving runs.
            let mut run: Option<(Point, Point)> = None;
            for d in candidate.points() {
                if f_outline.overlap_area_at(Point::ORIGIN, m_outline, d) == 0 {
                    run = match run {
                        None => Some((d, d)),
                        Some((start, _)) => Some((start, d)),
                    };
                } else if let Some((start, end)) = run.take() {
                    lines.push(OrthoLine::new(start, end));
                }
            }
            if let Some((start, end)) = run {
                lines.push(OrthoLine::new(start, end));
            }
        }
    }

    ConfigurationSpace::from_lines(lines)
}
