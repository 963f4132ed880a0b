use dungen::testing::{cycle_level, rect_template, square_template};
use dungen::{GeneratorOptions, LevelGenerator};
use mark_flaky_tests::flaky;
use std::time::Duration;

// Wall-clock behavior; retried because the timing of the first 100-trial
// checkpoint depends on the machine.
#[flaky]
#[test]
fn early_stop_by_wall_time_unwinds_quickly() {
    let mut level = cycle_level(40, vec![square_template(4), rect_template(4, 6)]);
    level.set_minimum_room_distance(2);

    let options = GeneratorOptions {
        max_duration: Some(Duration::ZERO),
        ..GeneratorOptions::default()
    };
    let report = LevelGenerator::new(options)
        .generate(&level, 0)
        .expect("a zero time budget is a failed run, not an error");
    assert!(
        !report.outcome.is_complete(),
        "40 constrained rooms cannot place before the first time check"
    );
    // The clock is consulted every 100 trials; the run must die at the
    // first checkpoint.
    assert!(
        report.stats.iterations <= 100,
        "stopped only after {} trials",
        report.stats.iterations
    );
}
