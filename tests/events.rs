use anyhow::Result;
use dungen::testing::{rect_template, square_template};
use dungen::{GenerationEvent, GeneratorOptions, LevelDescription, LevelGenerator};
use std::sync::mpsc;

#[test]
fn the_event_stream_narrates_the_run() -> Result<()> {
    let mut level = LevelDescription::new();
    let templates = vec![square_template(4), rect_template(4, 6)];
    for name in ["a", "b", "c"] {
        level.add_room(name, templates.clone())?;
    }
    level.add_passage("a", "b");
    level.add_passage("b", "c");
    level.add_passage("c", "a");

    let (sender, receiver) = mpsc::channel();
    let report = LevelGenerator::new(GeneratorOptions::default())
        .with_event_sender(sender)
        .generate(&level, 0)?;
    assert!(report.outcome.is_complete());

    let events: Vec<GenerationEvent> = receiver.try_iter().collect();
    assert!(!events.is_empty());

    // Exactly one Valid event, and it closes the stream.
    let valids: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, GenerationEvent::Valid(_)))
        .collect();
    assert_eq!(valids.len(), 1);
    let GenerationEvent::Valid(final_snapshot) = events.last().unwrap() else {
        panic!("the last event must be the final valid layout");
    };
    assert_eq!(final_snapshot.energy, 0.0);
    assert_eq!(final_snapshot.rooms.len(), 3, "all rooms placed at the end");

    // Every completed chain reported a partial layout with zero energy.
    let partials: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            GenerationEvent::PartialValid(s) => Some(s),
            _ => None,
        })
        .collect();
    assert!(!partials.is_empty());
    for snapshot in &partials {
        assert_eq!(snapshot.energy, 0.0);
    }

    // Accepted perturbations and Perturbed events agree.
    let perturbed = events
        .iter()
        .filter(|e| matches!(e, GenerationEvent::Perturbed(_)))
        .count() as u64;
    assert_eq!(perturbed, report.stats.accepted);
    Ok(())
}

#[test]
fn a_dropped_receiver_does_not_fail_the_run() -> Result<()> {
    let mut level = LevelDescription::new();
    level.add_room("a", vec![square_template(4)])?;
    level.add_room("b", vec![square_template(4)])?;
    level.add_passage("a", "b");

    let (sender, receiver) = mpsc::channel();
    drop(receiver);
    let report = LevelGenerator::new(GeneratorOptions::default())
        .with_event_sender(sender)
        .generate(&level, 0)?;
    assert!(report.outcome.is_complete());
    Ok(())
}
