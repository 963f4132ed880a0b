//! Door enumeration on room outlines.
//!
//! A door is a segment of the outline through which two rooms connect. Door
//! placement is described per template by a [`DoorMode`] and expanded into
//! [`DoorLine`]s by a [`DoorHandler`]. A door line is a compact encoding of
//! many candidate doors: a segment of admissible door *start* points plus
//! the shared door length and the outward [`Facing`] of the wall.
//!
//! The handler is a capability seam: the configuration-space builder only
//! consumes the `DoorHandler` trait, and [`DefaultDoorHandler`] is the
//! shipped implementation.

use crate::geometry::{OrthoLine, Point, Polygon};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Outward direction of the wall a door sits on.
///
/// Two doors can connect only when their facings are opposite: the rooms
/// stand on opposite sides of the shared wall segment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    /// The opposite facing.
    #[inline]
    pub fn opposite(self) -> Facing {
        match self {
            Facing::Up => Facing::Down,
            Facing::Down => Facing::Up,
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Facing of a wall given the counter-clockwise travel direction along
    /// it (interior to the left, so the outward normal is to the right).
    fn of_ccw_travel(d: Point) -> Facing {
        match (d.x.signum(), d.y.signum()) {
            (1, 0) => Facing::Down,
            (-1, 0) => Facing::Up,
            (0, 1) => Facing::Right,
            (0, -1) => Facing::Left,
            _ => unreachable!("side direction must be a unit axis step"),
        }
    }

    /// True for `Up`/`Down` walls (the door segment itself runs
    /// horizontally).
    #[inline]
    pub fn is_horizontal_wall(self) -> bool {
        matches!(self, Facing::Up | Facing::Down)
    }
}

/// A family of candidate doors on one wall.
///
/// `line` holds the admissible start points of the door segment in canonical
/// (min towards max) order; a door starting at `s` occupies `length` units
/// from `s` along the wall's axis. A single fixed door is a degenerate line
/// with one point.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DoorLine {
    pub line: OrthoLine,
    pub length: i32,
    pub facing: Facing,
}

impl DoorLine {
    /// World-space segment of the door starting at `start`.
    pub fn segment_at(&self, start: Point) -> OrthoLine {
        let end = if self.facing.is_horizontal_wall() {
            Point::new(start.x + self.length, start.y)
        } else {
            Point::new(start.x, start.y + self.length)
        };
        OrthoLine::new(start, end)
    }
}

/// Door placement policy for a template.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum DoorMode {
    /// Doors of `length` may start anywhere on any wall, keeping at least
    /// `margin` units clear of each corner.
    Simple { length: i32, margin: i32 },
    /// Doors only at the given outline segments.
    Specific(Vec<OrthoLine>),
}

impl DoorMode {
    /// Unit-length doors anywhere, flush with corners allowed.
    pub const UNIT: DoorMode = DoorMode::Simple { length: 1, margin: 0 };
}

/// Capability for expanding a template's [`DoorMode`] into door lines.
pub trait DoorHandler {
    /// Enumerate the door lines of `outline` under `mode`, in a
    /// deterministic order.
    fn door_lines(&self, outline: &Polygon, mode: &DoorMode) -> Result<Vec<DoorLine>>;
}

/// The standard door handler.
///
/// Walls are visited in outline order, so the result order is a pure
/// function of the template.
#[derive(Clone, Copy, Default, Debug)]
pub struct DefaultDoorHandler;

impl DoorHandler for DefaultDoorHandler {
    fn door_lines(&self, outline: &Polygon, mode: &DoorMode) -> Result<Vec<DoorLine>> {
        match mode {
            DoorMode::Simple { length, margin } => simple_lines(outline, *length, *margin),
            DoorMode::Specific(sockets) => specific_lines(outline, sockets),
        }
    }
}

fn simple_lines(outline: &Polygon, length: i32, margin: i32) -> Result<Vec<DoorLine>> {
    if length < 1 {
        bail!("door length must be at least 1, got {length}");
    }
    if margin < 0 {
        bail!("door margin must be non-negative, got {margin}");
    }
    let mut lines = Vec::new();
    for side in outline.sides() {
        let facing = Facing::of_ccw_travel(side.direction());
        let span = side.length() - length - 2 * margin;
        if span < 0 {
            continue; // wall too short for a door
        }
        let c = side.canonical();
        let lo = c.at(margin);
        let hi = c.at(margin + span);
        lines.push(DoorLine {
            line: OrthoLine::new(lo, hi),
            length,
            facing,
        });
    }
    if lines.is_empty() {
        bail!("no wall of the outline admits a door of length {length} with margin {margin}");
    }
    Ok(lines)
}

fn specific_lines(outline: &Polygon, sockets: &[OrthoLine]) -> Result<Vec<DoorLine>> {
    if sockets.is_empty() {
        bail!("specific door mode needs at least one door segment");
    }
    let mut lines = Vec::new();
    for socket in sockets {
        let s = socket.canonical();
        if s.length() < 1 {
            bail!("door segment {socket} must have positive length");
        }
        let side = outline
            .sides()
            .find(|side| {
                side.intersect(&s)
                    .is_some_and(|shared| shared.canonical() == s)
            })
            .ok_or_else(|| {
                anyhow::anyhow!("door segment {socket} does not lie on the outline")
            })?;
        lines.push(DoorLine {
            line: OrthoLine::point(s.from),
            length: s.length(),
            facing: Facing::of_ccw_travel(side.direction()),
        });
    }
    Ok(lines)
}
