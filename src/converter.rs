//! Lifting internal layouts back into the caller's node type.
//!
//! The evolver works on dense indices and never places corridor rooms.
//! Conversion therefore does three jobs:
//!
//! 1. translate each placed room's template outline to its absolute
//!    position,
//! 2. resolve every corridor: the first offset (in deterministic template
//!    and segment order) in the intersection of the two neighbors' shifted
//!    configuration spaces that overlaps nothing already placed,
//! 3. assign a concrete door segment to every passage of the input graph.
//!
//! In strict mode (complete layouts) an unresolvable corridor or doorless
//! passage is an invariant violation -- the constraints promised it could
//! not happen -- and surfaces as an error with diagnostic context. In
//! best-effort mode (cancelled runs) such entries are simply skipped.

use crate::cspaces::ConfigSpaces;
use crate::geometry::{OrthoLine, Point, Polygon};
use crate::layout::Layout;
use crate::mapping::{CompiledLevel, LevelDescription, NodeKey};
use crate::templates::{TemplateId, TemplateLibrary};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A room of the final layout, in world coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedRoom<N> {
    pub node: N,
    /// Offset applied to the template's canonical outline.
    pub position: Point,
    /// The outline already translated to world coordinates.
    pub outline: Polygon,
    /// Name of the chosen template, when it had one.
    pub template_name: Option<String>,
    pub is_corridor: bool,
}

/// The concrete door segment assigned to one passage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedDoor<N> {
    pub from: N,
    pub to: N,
    pub segment: OrthoLine,
}

/// The caller-facing result of a generation: every room placed on the
/// grid plus one door per passage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapLayout<N> {
    /// Rooms in the level description's node order.
    pub rooms: Vec<PlacedRoom<N>>,
    /// Doors in the level description's passage order.
    pub doors: Vec<PlacedDoor<N>>,
}

impl<N: PartialEq> MapLayout<N> {
    /// Find a room by its node.
    pub fn room(&self, node: &N) -> Option<&PlacedRoom<N>> {
        self.rooms.iter().find(|r| r.node == *node)
    }
}

impl<N: Serialize> MapLayout<N> {
    /// Serialize the layout as pretty-printed JSON. Byte-identical for
    /// identical layouts, which is what the determinism tests lean on.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON form to a file.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("writing layout to {}", path.as_ref().display()))?;
        Ok(())
    }
}

/// Convert an internal layout. `strict` distinguishes complete layouts
/// (invariant failures are errors) from best-effort partial conversion.
pub(crate) fn convert<N: NodeKey>(
    level: &LevelDescription<N>,
    compiled: &CompiledLevel,
    spaces: &ConfigSpaces,
    layout: &Layout,
    strict: bool,
) -> Result<MapLayout<N>> {
    let n = compiled.node_count();
    let lib = &compiled.library;

    // Rooms straight from the layout; corridors resolved against them.
    let mut placements: Vec<Option<(TemplateId, Point)>> = vec![None; n];
    for (node, config) in layout.placed() {
        placements[node] = Some((config.template, config.position));
    }

    for c in 0..n {
        if !compiled.corridor[c] {
            continue;
        }
        let Some((a, b)) = compiled.corridor_ends[c] else {
            continue;
        };
        let (Some((ta, pa)), Some((tb, pb))) = (placements[a], placements[b]) else {
            continue;
        };
        let found = resolve_corridor(compiled, spaces, &placements, c, (ta, pa), (tb, pb));
        match found {
            Some(placement) => placements[c] = Some(placement),
            None if strict => bail!(
                "corridor {c} between nodes {a} and {b} has no overlap-free placement; \
                 layout energy {}",
                layout.total_energy()
            ),
            None => {}
        }
    }

    let mut rooms = Vec::new();
    for v in 0..n {
        let Some((template, position)) = placements[v] else {
            continue;
        };
        let entry = lib.entry(template);
        rooms.push(PlacedRoom {
            node: level.node_at(v).expect("compiled index in range").clone(),
            position,
            outline: entry.template.outline.translate(position),
            template_name: entry.template.name.clone(),
            is_corridor: compiled.corridor[v],
        });
    }

    let mut doors = Vec::new();
    for &(u, v) in compiled.full_graph.edges() {
        let (Some(cu), Some(cv)) = (placements[u], placements[v]) else {
            continue;
        };
        match door_between(lib, cu, cv) {
            Some(segment) => doors.push(PlacedDoor {
                from: level.node_at(u).expect("compiled index in range").clone(),
                to: level.node_at(v).expect("compiled index in range").clone(),
                segment,
            }),
            None if strict => bail!(
                "passage between nodes {u} and {v} has no coincident door pair; \
                 layout energy {}",
                layout.total_energy()
            ),
            None => {}
        }
    }

    Ok(MapLayout { rooms, doors })
}

/// First overlap-free corridor placement bridging `a` and `b`, in
/// deterministic template and offset order.
fn resolve_corridor(
    compiled: &CompiledLevel,
    spaces: &ConfigSpaces,
    placements: &[Option<(TemplateId, Point)>],
    corridor: usize,
    (ta, pa): (TemplateId, Point),
    (tb, pb): (TemplateId, Point),
) -> Option<(TemplateId, Point)> {
    let lib = &compiled.library;
    for &tc in &compiled.templates[corridor] {
        let from_a = spaces.direct(ta, tc).translate(pa);
        let from_b = spaces.direct(tb, tc).translate(pb);
        let both = from_a.intersect(&from_b);
        'offsets: for p in both.offsets() {
            for (other, placement) in placements.iter().enumerate() {
                let Some((to, po)) = *placement else { continue };
                if other == corridor {
                    continue;
                }
                if lib.outline(tc).overlaps_at(p, lib.outline(to), po) {
                    continue 'offsets;
                }
            }
            return Some((tc, p));
        }
    }
    None
}

/// First coincident door segment between two placed templates.
fn door_between(
    lib: &TemplateLibrary,
    (tu, pu): (TemplateId, Point),
    (tv, pv): (TemplateId, Point),
) -> Option<OrthoLine> {
    for du in lib.doors(tu) {
        for dv in lib.doors(tv) {
            if dv.facing != du.facing.opposite() || dv.length != du.length {
                continue;
            }
            let starts_u = du.line.canonical().translate(pu);
            let starts_v = dv.line.canonical().translate(pv);
            if let Some(shared) = starts_u.intersect(&starts_v) {
                return Some(du.segment_at(shared.canonical().from));
            }
        }
    }
    None
}
