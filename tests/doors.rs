use anyhow::Result;
use dungen::{DefaultDoorHandler, DoorHandler, DoorMode, Facing, OrthoLine, Point, Polygon};

#[test]
fn simple_mode_enumerates_every_wall() -> Result<()> {
    let square = Polygon::rectangle(4, 4);
    let doors = DefaultDoorHandler.door_lines(&square, &DoorMode::UNIT)?;
    assert_eq!(doors.len(), 4, "one door line per wall");
    for door in &doors {
        assert_eq!(door.length, 1);
        // Unit door on a 4-long wall: starts 0..=3.
        assert_eq!(door.line.point_count(), 4);
    }
    let facings: Vec<Facing> = doors.iter().map(|d| d.facing).collect();
    assert!(facings.contains(&Facing::Up));
    assert!(facings.contains(&Facing::Down));
    assert!(facings.contains(&Facing::Left));
    assert!(facings.contains(&Facing::Right));
    Ok(())
}

#[test]
fn simple_mode_honors_margins() -> Result<()> {
    let square = Polygon::rectangle(4, 4);
    let doors = DefaultDoorHandler.door_lines(
        &square,
        &DoorMode::Simple {
            length: 2,
            margin: 1,
        },
    )?;
    // Span per wall: 4 - 2 - 2*1 = 0, a single admissible start.
    assert_eq!(doors.len(), 4);
    for door in &doors {
        assert_eq!(door.line.point_count(), 1);
    }
    Ok(())
}

#[test]
fn simple_mode_skips_too_short_walls() -> Result<()> {
    // A 2x1 sliver: length-2 doors fit only on the long walls.
    let sliver = Polygon::rectangle(2, 1);
    let doors = DefaultDoorHandler.door_lines(
        &sliver,
        &DoorMode::Simple {
            length: 2,
            margin: 0,
        },
    )?;
    assert_eq!(doors.len(), 2);
    assert!(
        doors
            .iter()
            .all(|d| matches!(d.facing, Facing::Up | Facing::Down))
    );
    Ok(())
}

#[test]
fn simple_mode_rejects_impossible_requests() {
    let square = Polygon::rectangle(4, 4);
    // No wall is 9 long.
    assert!(
        DefaultDoorHandler
            .door_lines(
                &square,
                &DoorMode::Simple {
                    length: 9,
                    margin: 0
                }
            )
            .is_err()
    );
    assert!(
        DefaultDoorHandler
            .door_lines(
                &square,
                &DoorMode::Simple {
                    length: 0,
                    margin: 0
                }
            )
            .is_err()
    );
}

#[test]
fn specific_mode_derives_facing_from_the_wall() -> Result<()> {
    let square = Polygon::rectangle(4, 4);
    let mode = DoorMode::Specific(vec![
        OrthoLine::new(Point::new(1, 0), Point::new(2, 0)),
        OrthoLine::new(Point::new(4, 1), Point::new(4, 2)),
    ]);
    let doors = DefaultDoorHandler.door_lines(&square, &mode)?;
    assert_eq!(doors.len(), 2);
    assert_eq!(doors[0].facing, Facing::Down);
    assert_eq!(doors[0].length, 1);
    assert_eq!(doors[1].facing, Facing::Right);
    // A fixed socket has exactly one admissible start.
    assert_eq!(doors[0].line.point_count(), 1);
    Ok(())
}

#[test]
fn specific_mode_rejects_off_boundary_segments() {
    let square = Polygon::rectangle(4, 4);
    // Interior segment.
    let inside = DoorMode::Specific(vec![OrthoLine::new(Point::new(1, 1), Point::new(2, 1))]);
    assert!(DefaultDoorHandler.door_lines(&square, &inside).is_err());
    // Hangs past the corner.
    let overhang = DoorMode::Specific(vec![OrthoLine::new(Point::new(3, 0), Point::new(5, 0))]);
    assert!(DefaultDoorHandler.door_lines(&square, &overhang).is_err());
}

#[test]
fn door_segments_extend_along_the_wall() {
    let square = Polygon::rectangle(4, 4);
    let doors = DefaultDoorHandler
        .door_lines(
            &square,
            &DoorMode::Simple {
                length: 2,
                margin: 0,
            },
        )
        .unwrap();
    let bottom = doors
        .iter()
        .find(|d| d.facing == Facing::Down)
        .expect("bottom wall door line");
    let segment = bottom.segment_at(Point::new(1, 0));
    assert_eq!(segment, OrthoLine::new(Point::new(1, 0), Point::new(3, 0)));
}
