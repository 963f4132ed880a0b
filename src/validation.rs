//! Pre-flight validation of level descriptions.
//!
//! Everything here runs synchronously before any generation state exists,
//! so a rejected level never publishes partial results. [`validate_level`]
//! collects *all* problems instead of stopping at the first; callers that
//! just want a pass/fail gate can use [`ensure_valid`].

use crate::doors::{DefaultDoorHandler, DoorHandler, DoorMode};
use crate::mapping::{LevelDescription, NodeKey};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// A single problem found in a level description.
///
/// Node identifiers are carried in their `Debug` rendering so the error type
/// stays free of the caller's node type parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelError {
    /// The level declares no rooms at all.
    Empty,
    /// A passage endpoint was never declared as a room.
    UnknownNode { node: String },
    /// A passage connects a room to itself.
    SelfLoop { node: String },
    /// The same two rooms are connected more than once (directly or through
    /// corridors).
    DuplicateAdjacency { a: String, b: String },
    /// The level graph is not connected.
    Disconnected,
    /// A corridor room must have exactly two passages.
    CorridorDegree { node: String, degree: usize },
    /// Two corridor rooms are directly connected; corridors must join
    /// ordinary rooms.
    CorridorChain { a: String, b: String },
    /// A room has an empty allowed-template list.
    NoTemplates { node: String },
    /// A template declares an empty set of door positions.
    NoDoors { node: String, template: String },
    /// A template's door mode fits nowhere on its outline (for example a
    /// door longer than every wall).
    DoorsInfeasible {
        node: String,
        template: String,
        reason: String,
    },
    /// The minimum room distance is negative.
    NegativeDistance { value: i32 },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Empty => write!(f, "level declares no rooms"),
            LevelError::UnknownNode { node } => {
                write!(f, "passage endpoint {node} is not a declared room")
            }
            LevelError::SelfLoop { node } => write!(f, "passage from {node} to itself"),
            LevelError::DuplicateAdjacency { a, b } => {
                write!(f, "rooms {a} and {b} are connected more than once")
            }
            LevelError::Disconnected => write!(f, "level graph is not connected"),
            LevelError::CorridorDegree { node, degree } => write!(
                f,
                "corridor room {node} has {degree} passages, corridors need exactly 2"
            ),
            LevelError::CorridorChain { a, b } => {
                write!(f, "corridor rooms {a} and {b} are directly connected")
            }
            LevelError::NoTemplates { node } => {
                write!(f, "room {node} has no allowed templates")
            }
            LevelError::NoDoors { node, template } => {
                write!(f, "template {template} of room {node} declares no doors")
            }
            LevelError::DoorsInfeasible {
                node,
                template,
                reason,
            } => {
                write!(f, "template {template} of room {node} admits no doors: {reason}")
            }
            LevelError::NegativeDistance { value } => {
                write!(f, "minimum room distance must be non-negative, got {value}")
            }
        }
    }
}

impl std::error::Error for LevelError {}

/// Check a level description and return every problem found.
pub fn validate_level<N: NodeKey>(level: &LevelDescription<N>) -> Vec<LevelError> {
    let mut errors = Vec::new();
    let n = level.node_count();

    if n == 0 {
        errors.push(LevelError::Empty);
        return errors;
    }
    if level.minimum_room_distance() < 0 {
        errors.push(LevelError::NegativeDistance {
            value: level.minimum_room_distance(),
        });
    }

    for i in 0..n {
        let spec = level.spec_at(i);
        let node = format!("{:?}", level.node_at(i).unwrap());
        if spec.templates.is_empty() {
            errors.push(LevelError::NoTemplates { node });
            continue;
        }
        // Expand every template's doors up front, so infeasible door
        // placement surfaces here instead of mid-generation.
        for (t, template) in spec.templates.iter().enumerate() {
            let label = template
                .name
                .clone()
                .unwrap_or_else(|| format!("#{t}"));
            if matches!(&template.doors, DoorMode::Specific(sockets) if sockets.is_empty()) {
                errors.push(LevelError::NoDoors {
                    node: node.clone(),
                    template: label,
                });
                continue;
            }
            if let Err(err) = DefaultDoorHandler.door_lines(&template.outline, &template.doors) {
                errors.push(LevelError::DoorsInfeasible {
                    node: node.clone(),
                    template: label,
                    reason: err.to_string(),
                });
            }
        }
    }

    // Resolve passages to indices, reporting unknown endpoints and
    // self-loops as we go.
    let mut adjacency: Vec<HashSet<usize>> = vec![HashSet::new(); n];
    let mut degree = vec![0usize; n];
    let mut seen_pairs = HashSet::new();
    for (a, b) in level.passages() {
        let ia = level.index_of(a);
        let ib = level.index_of(b);
        let (Some(ia), Some(ib)) = (ia, ib) else {
            for (idx, node) in [(ia, a), (ib, b)] {
                if idx.is_none() {
                    errors.push(LevelError::UnknownNode {
                        node: format!("{node:?}"),
                    });
                }
            }
            continue;
        };
        if ia == ib {
            errors.push(LevelError::SelfLoop {
                node: format!("{a:?}"),
            });
            continue;
        }
        let key = (ia.min(ib), ia.max(ib));
        if !seen_pairs.insert(key) {
            errors.push(LevelError::DuplicateAdjacency {
                a: format!("{a:?}"),
                b: format!("{b:?}"),
            });
            continue;
        }
        if level.spec_at(ia).corridor && level.spec_at(ib).corridor {
            errors.push(LevelError::CorridorChain {
                a: format!("{a:?}"),
                b: format!("{b:?}"),
            });
            continue;
        }
        adjacency[ia].insert(ib);
        adjacency[ib].insert(ia);
        degree[ia] += 1;
        degree[ib] += 1;
    }

    for i in 0..n {
        if level.spec_at(i).corridor && degree[i] != 2 {
            errors.push(LevelError::CorridorDegree {
                node: format!("{:?}", level.node_at(i).unwrap()),
                degree: degree[i],
            });
        }
    }

    // Contracting a corridor must not duplicate an existing room adjacency.
    let mut contracted = HashSet::new();
    for i in 0..n {
        if !level.spec_at(i).corridor || degree[i] != 2 {
            continue;
        }
        let mut ends: Vec<usize> = adjacency[i].iter().copied().collect();
        ends.sort_unstable();
        if let [a, b] = ends[..] {
            let key = (a, b);
            if !contracted.insert(key) || seen_pairs.contains(&key) {
                errors.push(LevelError::DuplicateAdjacency {
                    a: format!("{:?}", level.node_at(a).unwrap()),
                    b: format!("{:?}", level.node_at(b).unwrap()),
                });
            }
        }
    }

    if !is_connected(&adjacency) {
        errors.push(LevelError::Disconnected);
    }

    errors
}

/// Validate and fail with a combined message if anything is wrong.
pub fn ensure_valid<N: NodeKey>(level: &LevelDescription<N>) -> Result<()> {
    let errors = validate_level(level);
    if errors.is_empty() {
        return Ok(());
    }
    let joined = errors
        .iter()
        .map(LevelError::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    bail!("invalid level description: {joined}");
}

fn is_connected(adjacency: &[HashSet<usize>]) -> bool {
    let n = adjacency.len();
    if n == 0 {
        return true;
    }
    let mut seen = vec![false; n];
    let mut queue = VecDeque::from([0usize]);
    seen[0] = true;
    let mut count = 1;
    while let Some(u) = queue.pop_front() {
        for &v in &adjacency[u] {
            if !seen[v] {
                seen[v] = true;
                count += 1;
                queue.push_back(v);
            }
        }
    }
    count == n
}
