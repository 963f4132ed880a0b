//! Level descriptions and their compiled, integer-indexed form.
//!
//! Callers describe a level in their own node type `N`: rooms with allowed
//! templates, passages between rooms, corridor rooms sitting on passages.
//! [`LevelDescription`] canonicalizes the nodes to dense indices in
//! insertion order (an [`IndexMap`], so the order is deterministic), and
//! [`compile`] lowers the description into the [`CompiledLevel`] the
//! generator actually runs on:
//!
//! - the **full graph** over all nodes, used for validation and for door
//!   assignment on every passage, and
//! - the **rooms graph**, with each corridor node contracted into a single
//!   room-to-room edge. The evolver only ever places rooms; corridor nodes
//!   are resolved from their two neighbors at conversion time.

use crate::doors::DoorHandler;
use crate::graph::LevelGraph;
use crate::templates::{RoomTemplate, TemplateId, TemplateLibrary};
use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Caller-side node identifier. Blanket-implemented for anything hashable,
/// cloneable and debug-printable.
pub trait NodeKey: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> NodeKey for T {}

/// Policy controlling reuse of a shape alias across rooms.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Any room may repeat any shape.
    #[default]
    Allowed,
    /// A room must not share a shape alias with a placed neighbor.
    NoImmediate,
    /// A room must not share a shape alias with any placed room.
    NoRepeat,
}

#[derive(Clone, Debug)]
pub(crate) struct RoomSpec {
    pub templates: Vec<RoomTemplate>,
    pub repeat: RepeatMode,
    pub corridor: bool,
}

/// Input description of a level: rooms, passages, and placement policies.
#[derive(Clone, Debug)]
pub struct LevelDescription<N: NodeKey> {
    rooms: IndexMap<N, RoomSpec>,
    passages: Vec<(N, N)>,
    min_room_distance: i32,
}

impl<N: NodeKey> Default for LevelDescription<N> {
    fn default() -> Self {
        Self {
            rooms: IndexMap::new(),
            passages: Vec::new(),
            min_room_distance: 0,
        }
    }
}

impl<N: NodeKey> LevelDescription<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a room with its allowed templates.
    pub fn add_room(&mut self, node: N, templates: Vec<RoomTemplate>) -> Result<()> {
        self.insert(node, templates, false)
    }

    /// Declare a corridor room. Corridor rooms must end up with exactly two
    /// passages; their placement is implied by their neighbors.
    pub fn add_corridor_room(&mut self, node: N, templates: Vec<RoomTemplate>) -> Result<()> {
        self.insert(node, templates, true)
    }

    fn insert(&mut self, node: N, templates: Vec<RoomTemplate>, corridor: bool) -> Result<()> {
        if self.rooms.contains_key(&node) {
            bail!("room {node:?} declared twice");
        }
        self.rooms.insert(
            node,
            RoomSpec {
                templates,
                repeat: RepeatMode::default(),
                corridor,
            },
        );
        Ok(())
    }

    /// Set the repeat policy of one room.
    pub fn set_repeat_mode(&mut self, node: &N, mode: RepeatMode) -> Result<()> {
        let spec = self
            .rooms
            .get_mut(node)
            .with_context(|| format!("unknown room {node:?}"))?;
        spec.repeat = mode;
        Ok(())
    }

    /// Connect two declared rooms with a passage (a shared door).
    pub fn add_passage(&mut self, a: N, b: N) {
        self.passages.push((a, b));
    }

    /// Require every pair of non-adjacent rooms to keep at least this
    /// Chebyshev distance.
    pub fn set_minimum_room_distance(&mut self, distance: i32) {
        self.min_room_distance = distance;
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.rooms.len()
    }

    /// Nodes in canonical (insertion) order. The index of a node in this
    /// iteration is its internal index, which event snapshots refer to.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.rooms.keys()
    }

    /// The node at an internal index.
    pub fn node_at(&self, index: usize) -> Option<&N> {
        self.rooms.get_index(index).map(|(n, _)| n)
    }

    /// The internal index of a node.
    pub fn index_of(&self, node: &N) -> Option<usize> {
        self.rooms.get_index_of(node)
    }

    #[inline]
    pub fn minimum_room_distance(&self) -> i32 {
        self.min_room_distance
    }

    pub(crate) fn passages(&self) -> &[(N, N)] {
        &self.passages
    }

    pub(crate) fn spec_at(&self, index: usize) -> &RoomSpec {
        &self.rooms[index]
    }
}

/// The integer-indexed level the generator runs on. Immutable once built.
#[derive(Clone, Debug)]
pub(crate) struct CompiledLevel {
    /// Graph over all nodes, corridor nodes included.
    pub full_graph: LevelGraph,
    /// Graph with corridor nodes contracted away (they stay as isolated
    /// indices so both graphs share one index space).
    pub rooms_graph: LevelGraph,
    pub corridor: Vec<bool>,
    pub repeat: Vec<RepeatMode>,
    pub templates: Vec<Vec<TemplateId>>,
    pub library: TemplateLibrary,
    pub min_distance: i32,
    /// Contracted room edge `(min, max)` to the corridor node it runs
    /// through.
    pub corridor_of_edge: HashMap<(usize, usize), usize>,
    /// Corridor node to its two room endpoints.
    pub corridor_ends: Vec<Option<(usize, usize)>>,
}

impl CompiledLevel {
    #[inline]
    pub fn node_count(&self) -> usize {
        self.corridor.len()
    }

    /// Corridor node carried by the contracted room edge `{a, b}`, if any.
    pub fn corridor_between(&self, a: usize, b: usize) -> Option<usize> {
        let key = if a < b { (a, b) } else { (b, a) };
        self.corridor_of_edge.get(&key).copied()
    }
}

/// Lower a validated [`LevelDescription`] into its integer-indexed form.
///
/// `repeat_override`, when set, replaces every room's own repeat policy.
pub(crate) fn compile<N: NodeKey>(
    level: &LevelDescription<N>,
    handler: &dyn DoorHandler,
    repeat_override: Option<RepeatMode>,
) -> Result<CompiledLevel> {
    let n = level.node_count();
    let mut library = TemplateLibrary::new();
    let mut templates = Vec::with_capacity(n);
    let mut corridor = Vec::with_capacity(n);
    let mut repeat = Vec::with_capacity(n);

    for i in 0..n {
        let spec = level.spec_at(i);
        let mut ids: Vec<TemplateId> = Vec::with_capacity(spec.templates.len());
        for t in &spec.templates {
            let id = library.intern(t, handler).with_context(|| {
                format!("room {:?}: invalid template", level.node_at(i).unwrap())
            })?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        templates.push(ids);
        corridor.push(spec.corridor);
        repeat.push(repeat_override.unwrap_or(spec.repeat));
    }

    let mut full_graph = LevelGraph::new(n);
    for (a, b) in level.passages() {
        let (ia, ib) = (
            level.index_of(a).with_context(|| format!("passage endpoint {a:?} is not a room"))?,
            level.index_of(b).with_context(|| format!("passage endpoint {b:?} is not a room"))?,
        );
        full_graph.add_edge(ia, ib)?;
    }

    let mut rooms_graph = LevelGraph::new(n);
    let mut corridor_of_edge = HashMap::new();
    let mut corridor_ends = vec![None; n];
    for u in 0..n {
        if corridor[u] {
            let nb = full_graph.neighbors(u);
            // validation guarantees degree 2 with room endpoints
            let (a, b) = (nb[0], nb[1]);
            let key = if a < b { (a, b) } else { (b, a) };
            rooms_graph.add_edge(a, b).with_context(|| {
                format!("corridor {u} duplicates the room adjacency ({a}, {b})")
            })?;
            corridor_of_edge.insert(key, u);
            corridor_ends[u] = Some(key);
        }
    }
    for &(a, b) in full_graph.edges() {
        if !corridor[a] && !corridor[b] {
            rooms_graph.add_edge(a, b)?;
        }
    }

    Ok(CompiledLevel {
        full_graph,
        rooms_graph,
        corridor,
        repeat,
        templates,
        library,
        min_distance: level.minimum_room_distance(),
        corridor_of_edge,
        corridor_ends,
    })
}
