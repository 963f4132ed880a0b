//! Progress events published during a generation run.
//!
//! The generator pushes value-typed snapshots into an optional
//! `std::sync::mpsc` channel:
//!
//! - [`GenerationEvent::Perturbed`] after every *accepted* perturbation,
//! - [`GenerationEvent::PartialValid`] after a chain is placed validly,
//! - [`GenerationEvent::Valid`] once for the final complete layout.
//!
//! Snapshots carry internal node indices; map them back through
//! [`LevelDescription::node_at`](crate::LevelDescription::node_at). A
//! disconnected receiver never fails the run -- sends are fire-and-forget.

use crate::geometry::Point;
use crate::layout::Layout;
use crate::templates::TemplateId;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

/// One placed node inside a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRoom {
    /// Internal node index (see `LevelDescription::node_at`).
    pub node: usize,
    pub template: TemplateId,
    pub position: Point,
}

/// A value-typed copy of a partial layout at some instant of the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// Placed nodes in index order.
    pub rooms: Vec<SnapshotRoom>,
    /// Total layout energy at the time of the snapshot.
    pub energy: f64,
}

/// Events observable while a generation runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GenerationEvent {
    /// An accepted perturbation produced this layout.
    Perturbed(LayoutSnapshot),
    /// A chain completed with zero energy.
    PartialValid(LayoutSnapshot),
    /// The final, complete, valid layout.
    Valid(LayoutSnapshot),
}

pub(crate) fn snapshot(layout: &Layout) -> LayoutSnapshot {
    LayoutSnapshot {
        rooms: layout
            .placed()
            .map(|(node, config)| SnapshotRoom {
                node,
                template: config.template,
                position: config.position,
            })
            .collect(),
        energy: layout.total_energy(),
    }
}

/// Fire-and-forget wrapper around the optional event channel. The closure
/// keeps snapshot construction off the hot path when nobody listens.
#[derive(Clone, Default)]
pub(crate) struct EventSink {
    sender: Option<Sender<GenerationEvent>>,
}

impl EventSink {
    pub fn new(sender: Option<Sender<GenerationEvent>>) -> Self {
        Self { sender }
    }

    pub fn emit(&self, event: impl FnOnce() -> GenerationEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event());
        }
    }
}
