//! Chain decomposition: ordering the rooms graph into small placement
//! units.
//!
//! The planner never places the whole level at once. The graph is broken
//! into **chains** -- small connected pieces placed one after another --
//! in two stages:
//!
//! 1. **Faces.** Small cycles are extracted by repeatedly taking a shortest
//!    cycle through an edge not yet on any face. Faces are ordered by size,
//!    then by their lowest node index, and become chains first (cycles are
//!    the rigid parts of a level, so placing them early fails fast).
//! 2. **Trees.** The remaining edges form trees hanging off the face cover.
//!    Each tree is walked breadth-first from its attachment root, emitting
//!    a chain whenever the walk hits a branch point or the configured size
//!    cap.
//!
//! Chains partition the (non-corridor) nodes: a node belongs to the chain
//! that introduces it, and every later chain's originating face or tree
//! touches the union of the earlier ones in at least one node.
//!
//! The whole decomposition is a pure function of the graph and the
//! options.

use crate::doors::DefaultDoorHandler;
use crate::graph::LevelGraph;
use crate::mapping::{LevelDescription, NodeKey, compile};
use crate::validation::ensure_valid;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Options controlling stage 2 of the decomposition.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ChainOptions {
    /// Maximum number of nodes a tree chain may introduce.
    pub max_tree_size: usize,
    /// Solve tree chains by deterministic first-fit placement instead of
    /// annealing.
    pub greedy_trees: bool,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            max_tree_size: 8,
            greedy_trees: false,
        }
    }
}

/// One placement unit: the nodes a planner step introduces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    /// Position in the placement order.
    pub index: usize,
    /// Introduced nodes, in placement order.
    pub nodes: Vec<usize>,
    /// True if the chain came from a cycle in stage 1. Face chains are
    /// never reseeded by annealing stage 2.
    pub from_face: bool,
}

/// Decompose a level description into chains, exactly as a generation run
/// would. Node values are internal indices
/// (see [`LevelDescription::node_at`]); corridor rooms never appear.
pub fn decompose_level<N: NodeKey>(
    level: &LevelDescription<N>,
    options: &ChainOptions,
) -> Result<Vec<Chain>> {
    ensure_valid(level)?;
    let compiled = compile(level, &DefaultDoorHandler, None)?;
    let active: Vec<bool> = compiled.corridor.iter().map(|&c| !c).collect();
    Ok(decompose(&compiled.rooms_graph, &active, options))
}

fn push_chain(chains: &mut Vec<Chain>, nodes: Vec<usize>, from_face: bool) {
    if !nodes.is_empty() {
        chains.push(Chain {
            index: chains.len(),
            nodes,
            from_face,
        });
    }
}

/// Decompose the active (non-corridor) part of `graph` into chains.
///
/// `active[v]` marks the nodes that participate; corridor nodes are
/// contracted away before decomposition and stay out of every chain.
pub(crate) fn decompose(
    graph: &LevelGraph,
    active: &[bool],
    options: &ChainOptions,
) -> Vec<Chain> {
    let n = graph.node_count();
    let mut faces = extract_faces(graph);
    // Size ascending, then lowest touched node, mirrors "small rigid parts
    // first".
    faces.sort_by_key(|f| (f.len(), f.iter().copied().min().unwrap_or(usize::MAX)));

    let face_edges: HashSet<(usize, usize)> =
        faces.iter().flat_map(|f| cycle_edges(f)).collect();

    let mut covered = vec![false; n];
    let mut covered_count = 0usize;
    let active_count = active.iter().filter(|&&a| a).count();
    let mut face_done = vec![false; faces.len()];
    let mut chains: Vec<Chain> = Vec::new();

    while covered_count < active_count {
        // Stage 1: the first pending face touching the cover (any face when
        // nothing is covered yet).
        let next_face = (0..faces.len()).find(|&i| {
            !face_done[i] && (covered_count == 0 || faces[i].iter().any(|&v| covered[v]))
        });

        if let Some(fi) = next_face {
            face_done[fi] = true;
            let cycle = &faces[fi];
            // Start the walk at the first already-covered node so fresh
            // nodes come out in adjacency order.
            let start = cycle.iter().position(|&v| covered[v]).unwrap_or(0);
            let mut fresh = Vec::new();
            for k in 0..cycle.len() {
                let v = cycle[(start + k) % cycle.len()];
                if !covered[v] {
                    covered[v] = true;
                    covered_count += 1;
                    fresh.push(v);
                }
            }
            push_chain(&mut chains, fresh, true);
            continue;
        }

        // Stage 2: grow a tree from the cover along non-face edges.
        let root = tree_root(graph, active, &covered, &face_edges);
        let fresh_root = !covered[root];
        if fresh_root {
            covered[root] = true;
            covered_count += 1;
        }
        covered_count += tree_chains(
            graph,
            active,
            &face_edges,
            &mut covered,
            root,
            fresh_root,
            options.max_tree_size,
            &mut chains,
        );
    }

    chains
}

/// Pick the root of the next tree walk: the lowest covered node with an
/// uncovered tree neighbor, else the lowest uncovered active node (start of
/// the walk for an acyclic graph).
fn tree_root(
    graph: &LevelGraph,
    active: &[bool],
    covered: &[bool],
    face_edges: &HashSet<(usize, usize)>,
) -> usize {
    for v in 0..graph.node_count() {
        if !covered[v] {
            continue;
        }
        let has_pending = graph
            .neighbors(v)
            .iter()
            .any(|&u| active[u] && !covered[u] && !face_edges.contains(&edge_key(v, u)));
        if has_pending {
            return v;
        }
    }
    (0..graph.node_count())
        .find(|&v| active[v] && !covered[v])
        .expect("tree root requested with nothing uncovered")
}

/// Breadth-first tree walk from `root`, chopping the visit order into
/// chains at branch points and at the size cap. Returns the number of
/// nodes newly covered by the walk (excluding the root).
#[allow(clippy::too_many_arguments)]
fn tree_chains(
    graph: &LevelGraph,
    active: &[bool],
    face_edges: &HashSet<(usize, usize)>,
    covered: &mut [bool],
    root: usize,
    include_root: bool,
    max_size: usize,
    chains: &mut Vec<Chain>,
) -> usize {
    let max_size = max_size.max(1);
    let mut queue = VecDeque::from([root]);
    let mut current: Vec<usize> = if include_root { vec![root] } else { Vec::new() };
    let mut newly = 0usize;

    while let Some(u) = queue.pop_front() {
        let children: Vec<usize> = graph
            .neighbors(u)
            .iter()
            .copied()
            .filter(|&v| active[v] && !covered[v] && !face_edges.contains(&edge_key(u, v)))
            .collect();
        // A branch point closes the running chain before fanning out.
        if children.len() > 1 && !current.is_empty() {
            push_chain(chains, std::mem::take(&mut current), false);
        }
        for v in children {
            covered[v] = true;
            newly += 1;
            current.push(v);
            queue.push_back(v);
            if current.len() >= max_size {
                push_chain(chains, std::mem::take(&mut current), false);
            }
        }
    }
    push_chain(chains, current, false);
    newly
}

/// Extract faces: shortest cycles through edges not yet on any face.
fn extract_faces(graph: &LevelGraph) -> Vec<Vec<usize>> {
    let mut faces = Vec::new();
    let mut used: HashSet<(usize, usize)> = HashSet::new();
    for &(u, v) in graph.edges() {
        if used.contains(&edge_key(u, v)) {
            continue;
        }
        if let Some(cycle) = graph.shortest_cycle_through(u, v) {
            for e in cycle_edges(&cycle) {
                used.insert(e);
            }
            faces.push(cycle);
        }
    }
    faces
}

fn cycle_edges(cycle: &[usize]) -> Vec<(usize, usize)> {
    let n = cycle.len();
    (0..n)
        .map(|i| edge_key(cycle[i], cycle[(i + 1) % n]))
        .collect()
}

#[inline]
fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}
