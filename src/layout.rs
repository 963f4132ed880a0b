//! Partial layouts: the evolving assignment of configurations to nodes.
//!
//! A [`Layout`] maps node indices to [`Configuration`]s for every node
//! placed so far; nodes outside the placed chains are simply absent. Each
//! configuration caches an [`EnergyBlock`], so the total layout energy is a
//! sum over slots.
//!
//! Layouts are cloned on every accepted perturbation. Entries are stored
//! behind `Arc`s so a clone copies one pointer per node and an edit swaps a
//! single entry -- the copy-on-write discipline the planner and evolver
//! share layouts under. Energy blocks live inside the entries and are never
//! shared across layouts.

use crate::geometry::Point;
use crate::templates::TemplateId;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Cached per-node energy, split into one slot per constraint.
///
/// `energy` is always the sum of the slots. Equality and hashing cover
/// every field via the floats' bit patterns.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct EnergyBlock {
    pub energy: f64,
    /// Overlap constraint: weighted overlapped area.
    pub overlap: f64,
    /// Corridor constraint: summed L1 gaps to bridgeable offsets.
    pub corridor_gap: f64,
    /// Minimum-distance constraint: summed L-infinity shortfalls.
    pub distance_gap: f64,
}

impl EnergyBlock {
    /// Zero energy under every active constraint.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.energy == 0.0
    }
}

impl Eq for EnergyBlock {}

impl Hash for EnergyBlock {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.energy.to_bits().hash(state);
        self.overlap.to_bits().hash(state);
        self.corridor_gap.to_bits().hash(state);
        self.distance_gap.to_bits().hash(state);
    }
}

/// A node's current placement: template, offset of the template's canonical
/// outline, and the cached energy block.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) struct Configuration {
    pub template: TemplateId,
    pub position: Point,
    pub energy: EnergyBlock,
}

impl Configuration {
    pub fn new(template: TemplateId, position: Point, energy: EnergyBlock) -> Self {
        Self {
            template,
            position,
            energy,
        }
    }
}

/// Copy-on-write assignment of configurations to node indices.
#[derive(Clone, Debug, Default)]
pub(crate) struct Layout {
    slots: Vec<Option<Arc<Configuration>>>,
}

impl Layout {
    /// An empty layout over `node_count` slots.
    pub fn empty(node_count: usize) -> Self {
        Self {
            slots: vec![None; node_count],
        }
    }

    #[inline]
    pub fn get(&self, node: usize) -> Option<&Configuration> {
        self.slots[node].as_deref()
    }

    /// Replace (or insert) a node's configuration.
    #[inline]
    pub fn set(&mut self, node: usize, config: Configuration) {
        self.slots[node] = Some(Arc::new(config));
    }

    /// Placed nodes in index order.
    pub fn placed(&self) -> impl Iterator<Item = (usize, &Configuration)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_deref().map(|c| (i, c)))
    }

    /// Sum of the placed nodes' energies.
    pub fn total_energy(&self) -> f64 {
        self.placed().map(|(_, c)| c.energy.energy).sum()
    }

    /// True when every placed node has zero energy.
    pub fn is_valid(&self) -> bool {
        self.placed().all(|(_, c)| c.energy.is_valid())
    }
}
