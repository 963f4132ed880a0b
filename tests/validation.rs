use anyhow::Result;
use dungen::testing::{corridor_templates, square_template};
use dungen::{
    DoorMode, LevelDescription, LevelError, Polygon, RoomTemplate, ensure_valid, validate_level,
};

fn has(errors: &[LevelError], pred: impl Fn(&LevelError) -> bool) -> bool {
    errors.iter().any(pred)
}

#[test]
fn empty_levels_are_rejected() {
    let level: LevelDescription<u32> = LevelDescription::new();
    let errors = validate_level(&level);
    assert!(has(&errors, |e| matches!(e, LevelError::Empty)));
    assert!(ensure_valid(&level).is_err());
}

#[test]
fn unknown_passage_endpoints_are_reported() -> Result<()> {
    let mut level = LevelDescription::new();
    level.add_room("a", vec![square_template(4)])?;
    level.add_passage("a", "ghost");
    let errors = validate_level(&level);
    assert!(has(&errors, |e| matches!(e, LevelError::UnknownNode { .. })));
    Ok(())
}

#[test]
fn self_loops_are_reported() -> Result<()> {
    let mut level = LevelDescription::new();
    level.add_room("a", vec![square_template(4)])?;
    level.add_passage("a", "a");
    let errors = validate_level(&level);
    assert!(has(&errors, |e| matches!(e, LevelError::SelfLoop { .. })));
    Ok(())
}

#[test]
fn duplicate_passages_are_reported() -> Result<()> {
    let mut level = LevelDescription::new();
    level.add_room("a", vec![square_template(4)])?;
    level.add_room("b", vec![square_template(4)])?;
    level.add_passage("a", "b");
    level.add_passage("b", "a");
    let errors = validate_level(&level);
    assert!(has(&errors, |e| matches!(
        e,
        LevelError::DuplicateAdjacency { .. }
    )));
    Ok(())
}

#[test]
fn disconnected_graphs_are_reported() -> Result<()> {
    let mut level = LevelDescription::new();
    level.add_room("a", vec![square_template(4)])?;
    level.add_room("b", vec![square_template(4)])?;
    level.add_room("c", vec![square_template(4)])?;
    level.add_passage("a", "b");
    let errors = validate_level(&level);
    assert!(has(&errors, |e| matches!(e, LevelError::Disconnected)));
    Ok(())
}

#[test]
fn corridor_degree_must_be_two() -> Result<()> {
    // Degree 1.
    let mut dangling = LevelDescription::new();
    dangling.add_room("a", vec![square_template(4)])?;
    dangling.add_corridor_room("c", corridor_templates())?;
    dangling.add_passage("a", "c");
    let errors = validate_level(&dangling);
    assert!(has(&errors, |e| matches!(
        e,
        LevelError::CorridorDegree { degree: 1, .. }
    )));

    // Degree 3.
    let mut busy = LevelDescription::new();
    for name in ["a", "b", "d"] {
        busy.add_room(name, vec![square_template(4)])?;
    }
    busy.add_corridor_room("c", corridor_templates())?;
    busy.add_passage("a", "c");
    busy.add_passage("b", "c");
    busy.add_passage("d", "c");
    let errors = validate_level(&busy);
    assert!(has(&errors, |e| matches!(
        e,
        LevelError::CorridorDegree { degree: 3, .. }
    )));
    Ok(())
}

#[test]
fn chained_corridors_are_reported() -> Result<()> {
    let mut level = LevelDescription::new();
    level.add_room("a", vec![square_template(4)])?;
    level.add_room("b", vec![square_template(4)])?;
    level.add_corridor_room("c1", corridor_templates())?;
    level.add_corridor_room("c2", corridor_templates())?;
    level.add_passage("a", "c1");
    level.add_passage("c1", "c2");
    level.add_passage("c2", "b");
    let errors = validate_level(&level);
    assert!(has(&errors, |e| matches!(e, LevelError::CorridorChain { .. })));
    Ok(())
}

#[test]
fn corridor_parallel_to_a_passage_is_reported() -> Result<()> {
    let mut level = LevelDescription::new();
    level.add_room("a", vec![square_template(4)])?;
    level.add_room("b", vec![square_template(4)])?;
    level.add_corridor_room("c", corridor_templates())?;
    level.add_passage("a", "b");
    level.add_passage("a", "c");
    level.add_passage("c", "b");
    let errors = validate_level(&level);
    assert!(has(&errors, |e| matches!(
        e,
        LevelError::DuplicateAdjacency { .. }
    )));
    Ok(())
}

#[test]
fn rooms_need_templates_and_distances_must_be_positive() -> Result<()> {
    let mut level = LevelDescription::new();
    level.add_room("a", vec![])?;
    level.add_room("b", vec![square_template(4)])?;
    level.add_passage("a", "b");
    level.set_minimum_room_distance(-1);
    let errors = validate_level(&level);
    assert!(has(&errors, |e| matches!(e, LevelError::NoTemplates { .. })));
    assert!(has(&errors, |e| matches!(
        e,
        LevelError::NegativeDistance { value: -1 }
    )));
    Ok(())
}

#[test]
fn infeasible_door_lengths_are_reported_pre_flight() -> Result<()> {
    // A door longer than every wall of a 4x4 square.
    let too_long = RoomTemplate::new(
        Polygon::rectangle(4, 4),
        DoorMode::Simple {
            length: 9,
            margin: 0,
        },
    );
    let mut level = LevelDescription::new();
    level.add_room("a", vec![too_long])?;
    level.add_room("b", vec![square_template(4)])?;
    level.add_passage("a", "b");
    let errors = validate_level(&level);
    assert!(has(&errors, |e| matches!(
        e,
        LevelError::DoorsInfeasible { .. }
    )));
    assert!(ensure_valid(&level).is_err());
    Ok(())
}

#[test]
fn doorless_templates_are_reported_pre_flight() -> Result<()> {
    let doorless = RoomTemplate::new(Polygon::rectangle(4, 4), DoorMode::Specific(vec![]));
    let mut level = LevelDescription::new();
    level.add_room("a", vec![doorless])?;
    level.add_room("b", vec![square_template(4)])?;
    level.add_passage("a", "b");
    let errors = validate_level(&level);
    assert!(has(&errors, |e| matches!(e, LevelError::NoDoors { .. })));
    Ok(())
}

#[test]
fn duplicate_rooms_are_rejected_at_insertion() -> Result<()> {
    let mut level = LevelDescription::new();
    level.add_room("a", vec![square_template(4)])?;
    assert!(level.add_room("a", vec![square_template(4)]).is_err());
    Ok(())
}

#[test]
fn valid_levels_pass() -> Result<()> {
    let mut level = LevelDescription::new();
    level.add_room("a", vec![square_template(4)])?;
    level.add_room("b", vec![square_template(4)])?;
    level.add_passage("a", "b");
    assert!(validate_level(&level).is_empty());
    ensure_valid(&level)?;
    Ok(())
}
