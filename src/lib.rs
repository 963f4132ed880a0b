//! # Dungen
//!
//! A **graph-constrained procedural layout generator** for Rust. Dungen
//! takes the topology of a level -- rooms as nodes, doorways and corridors
//! as edges -- plus a library of candidate room shapes, and produces a
//! concrete embedding: non-overlapping axis-aligned polygons on an integer
//! grid, connected exactly as the graph demands.
//!
//! ## Key Features
//!
//! - **Declarative level descriptions** - rooms, passages, corridor rooms,
//!   per-room template sets and repeat policies
//! - **Configuration-space search** - all legal relative placements of
//!   every template pair are precomputed once, so the optimizer only ever
//!   proposes door-coincident positions
//! - **Simulated annealing over chains** - the graph is decomposed into
//!   small chains placed incrementally by a two-stage annealer under a
//!   backtracking planner
//! - **Pluggable constraints** - overlap, corridor feasibility, and
//!   minimum room distance, each contributing an additive energy term
//! - **Deterministic** - every stochastic step draws from one injected
//!   PRNG; the same seed and inputs reproduce the layout byte for byte
//! - **Observable** - progress events, run statistics, cooperative
//!   cancellation, and optional early-stop caps
//!
//! ## Quick Start
//!
//! ```no_run
//! use dungen::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! // Describe the level: three rooms in a triangle.
//! let square = RoomTemplate::new(Polygon::rectangle(4, 4), DoorMode::UNIT);
//! let mut level = LevelDescription::new();
//! for name in ["hall", "vault", "lab"] {
//!     level.add_room(name, vec![square.clone()])?;
//! }
//! level.add_passage("hall", "vault");
//! level.add_passage("vault", "lab");
//! level.add_passage("lab", "hall");
//!
//! // Generate with a fixed seed.
//! let generator = LevelGenerator::new(GeneratorOptions::default());
//! let report = generator.generate(&level, 0)?;
//! if let GenerationOutcome::Complete(layout) = &report.outcome {
//!     for room in &layout.rooms {
//!         println!("{} at {}", room.node, room.position);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### `LevelDescription`
//!
//! The input: declare rooms with [`LevelDescription::add_room`] (or
//! [`add_corridor_room`](LevelDescription::add_corridor_room) for degree-2
//! connector rooms), connect them with
//! [`add_passage`](LevelDescription::add_passage), and optionally demand a
//! minimum distance between unrelated rooms.
//!
//! ### Templates and doors
//!
//! A [`RoomTemplate`] couples an orthogonal outline ([`Polygon`]) with a
//! [`DoorMode`]: either doors of a fixed length anywhere on the walls, or
//! an explicit list of door segments. Structurally identical templates
//! share an alias, which is what [`RepeatMode`] policies compare.
//!
//! ### Generation
//!
//! [`LevelGenerator::generate`] runs the whole pipeline and returns a
//! [`GenerationReport`]: an outcome (complete layout, cancelled with a
//! best-effort partial, or search exhausted) plus [`GenerationStats`].
//! Subscribe an `mpsc` channel via
//! [`with_event_sender`](LevelGenerator::with_event_sender) to watch the
//! optimizer work.

pub mod annealing;
pub mod chains;
mod constraints;
mod controller;
pub mod converter;
pub mod cspaces;
pub mod doors;
pub mod events;
pub mod generator;
pub mod geometry;
mod graph;
pub mod layout;
pub mod mapping;
mod planner;
pub mod stats;
pub mod templates;
pub mod testing;
pub mod validation;

// Re-export the public surface at the crate root.
pub use annealing::AnnealingOptions;
pub use chains::{Chain, ChainOptions, decompose_level};
pub use converter::{MapLayout, PlacedDoor, PlacedRoom};
pub use cspaces::{ConfigurationSpace, configuration_space_between};
pub use doors::{DefaultDoorHandler, DoorHandler, DoorLine, DoorMode, Facing};
pub use events::{GenerationEvent, LayoutSnapshot, SnapshotRoom};
pub use generator::{GenerationOutcome, GenerationReport, GeneratorOptions, LevelGenerator};
pub use geometry::{OrthoLine, Point, Polygon, Rect};
pub use layout::EnergyBlock;
pub use mapping::{LevelDescription, NodeKey, RepeatMode};
pub use stats::GenerationStats;
pub use templates::{RoomTemplate, TemplateId};
pub use validation::{LevelError, ensure_valid, validate_level};
