//! Testing utilities for layout generation.
//!
//! This module ships the fixtures and assertions the crate's own test suite
//! runs on, and they are just as useful for end users sanity-checking their
//! level descriptions:
//!
//! - **Fixtures**: small room templates and ready-made level shapes
//!   (paths, cycles, corridor links).
//! - **Assertions**: structural checks over a finished [`MapLayout`] --
//!   no overlaps, doors on both boundaries, minimum distances.
//!
//! Everything here is deterministic; fixtures build the same level every
//! call.

use crate::converter::MapLayout;
use crate::doors::DoorMode;
use crate::geometry::{OrthoLine, Point, Polygon};
use crate::mapping::LevelDescription;
use crate::templates::RoomTemplate;

/// A `size x size` square with unit doors anywhere on the boundary.
pub fn square_template(size: i32) -> RoomTemplate {
    RoomTemplate::new(Polygon::rectangle(size, size), DoorMode::UNIT)
        .named(format!("square{size}"))
}

/// A `width x height` rectangle with unit doors anywhere on the boundary.
pub fn rect_template(width: i32, height: i32) -> RoomTemplate {
    RoomTemplate::new(Polygon::rectangle(width, height), DoorMode::UNIT)
        .named(format!("rect{width}x{height}"))
}

/// A 4x4 square with exactly one unit door in a fixed spot on each wall.
///
/// Doors sit one unit from the lower-left corner of each wall, so two of
/// these squares connect at exactly four relative offsets: `(4, 0)`,
/// `(-4, 0)`, `(0, 4)` and `(0, -4)`.
pub fn four_door_square() -> RoomTemplate {
    let sockets = vec![
        OrthoLine::new(Point::new(1, 0), Point::new(2, 0)), // bottom
        OrthoLine::new(Point::new(4, 1), Point::new(4, 2)), // right
        OrthoLine::new(Point::new(1, 4), Point::new(2, 4)), // top
        OrthoLine::new(Point::new(0, 1), Point::new(0, 2)), // left
    ];
    RoomTemplate::new(Polygon::rectangle(4, 4), DoorMode::Specific(sockets)).named("four-door")
}

/// The two orientations of a 2x1 corridor piece, with unit doors on the
/// short ends only.
pub fn corridor_templates() -> Vec<RoomTemplate> {
    let horizontal = RoomTemplate::new(
        Polygon::rectangle(2, 1),
        DoorMode::Specific(vec![
            OrthoLine::new(Point::new(0, 0), Point::new(0, 1)),
            OrthoLine::new(Point::new(2, 0), Point::new(2, 1)),
        ]),
    )
    .named("corridor-h");
    let vertical = RoomTemplate::new(
        Polygon::rectangle(1, 2),
        DoorMode::Specific(vec![
            OrthoLine::new(Point::new(0, 0), Point::new(1, 0)),
            OrthoLine::new(Point::new(0, 2), Point::new(1, 2)),
        ]),
    )
    .named("corridor-v");
    vec![horizontal, vertical]
}

/// A path `0 - 1 - ... - n-1`, every room allowed the given templates.
pub fn path_level(n: u32, templates: Vec<RoomTemplate>) -> LevelDescription<u32> {
    let mut level = LevelDescription::new();
    for i in 0..n {
        level
            .add_room(i, templates.clone())
            .expect("fixture nodes are unique");
    }
    for i in 1..n {
        level.add_passage(i - 1, i);
    }
    level
}

/// A cycle `0 - 1 - ... - n-1 - 0`, every room allowed the given
/// templates.
pub fn cycle_level(n: u32, templates: Vec<RoomTemplate>) -> LevelDescription<u32> {
    let mut level = path_level(n, templates);
    level.add_passage(n - 1, 0);
    level
}

/// Assert that no two rooms of the layout share interior area.
///
/// # Panics
///
/// Panics naming the first offending pair.
pub fn assert_no_overlaps<N: std::fmt::Debug>(layout: &MapLayout<N>) {
    for (i, a) in layout.rooms.iter().enumerate() {
        for b in layout.rooms.iter().skip(i + 1) {
            let area = a
                .outline
                .overlap_area_at(Point::ORIGIN, &b.outline, Point::ORIGIN);
            assert_eq!(
                area, 0,
                "rooms {:?} and {:?} overlap with area {area}",
                a.node, b.node
            );
        }
    }
}

/// Assert that every listed passage got a door lying on both rooms'
/// boundaries.
///
/// # Panics
///
/// Panics naming the first passage without a proper door.
pub fn assert_doors_connected<N: PartialEq + std::fmt::Debug>(
    layout: &MapLayout<N>,
    passages: &[(N, N)],
) {
    for (a, b) in passages {
        let door = layout
            .doors
            .iter()
            .find(|d| {
                (d.from == *a && d.to == *b) || (d.from == *b && d.to == *a)
            })
            .unwrap_or_else(|| panic!("passage {a:?} - {b:?} has no door"));
        for node in [a, b] {
            let room = layout
                .room(node)
                .unwrap_or_else(|| panic!("room {node:?} missing from layout"));
            let on_boundary = room.outline.sides().any(|side| {
                side.intersect(&door.segment)
                    .is_some_and(|shared| shared.canonical() == door.segment.canonical())
            });
            assert!(
                on_boundary,
                "door {} of passage {a:?} - {b:?} does not lie on the boundary of {node:?}",
                door.segment
            );
        }
    }
}

/// Assert the minimum Chebyshev distance between all pairs of
/// non-adjacent, non-corridor rooms.
///
/// # Panics
///
/// Panics naming the first pair closer than `distance`.
pub fn assert_min_distance<N: PartialEq + std::fmt::Debug>(
    layout: &MapLayout<N>,
    passages: &[(N, N)],
    distance: i32,
) {
    let adjacent = |x: &N, y: &N| {
        passages
            .iter()
            .any(|(a, b)| (a == x && b == y) || (a == y && b == x))
    };
    for (i, a) in layout.rooms.iter().enumerate() {
        for b in layout.rooms.iter().skip(i + 1) {
            if a.is_corridor || b.is_corridor || adjacent(&a.node, &b.node) {
                continue;
            }
            let d = a
                .outline
                .chebyshev_distance_at(Point::ORIGIN, &b.outline, Point::ORIGIN);
            assert!(
                d >= distance,
                "rooms {:?} and {:?} are {d} apart, expected at least {distance}",
                a.node,
                b.node
            );
        }
    }
}
