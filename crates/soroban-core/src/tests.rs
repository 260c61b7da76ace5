//! Cross-module checks for sequences and instructions.

use crate::codec::{to_state, BeadType};
use crate::config::AbacusConfig;
use crate::diff::Direction;
use crate::grid::BeadGrid;
use crate::instruction::{generate_instruction, ExpectedAction};
use crate::sequence::{generate_sequence, Planner};
use crate::validate::IssueCode;

fn shapes(start: i64, target: i64) -> Vec<(String, Vec<(u32, BeadType, Direction)>)> {
    generate_sequence(start, target)
        .steps
        .iter()
        .map(|step| {
            (
                step.mathematical_term.clone(),
                step.changes()
                    .iter()
                    .map(|c| (c.place_value, c.bead_type, c.direction))
                    .collect(),
            )
        })
        .collect()
}

#[test]
fn three_plus_four_uses_the_five_complement() {
    let instruction = generate_instruction(3, 7, None);
    assert_eq!(instruction.expected_action, ExpectedAction::MultiStep);
    assert_eq!(instruction.highlight_beads.len(), 2);

    let heaven = instruction
        .highlight_beads
        .iter()
        .find(|c| c.bead_type == BeadType::Heaven)
        .expect("heaven bead highlighted");
    assert_eq!(heaven.direction, Direction::Activate);

    let earth = instruction
        .highlight_beads
        .iter()
        .find(|c| c.bead_type == BeadType::Earth)
        .expect("earth bead highlighted");
    assert_eq!(earth.direction, Direction::Deactivate);
    assert_eq!(earth.position, Some(2));

    assert!(instruction.action_description.contains("3 + 4 = 3 + (5 - 1)"));
}

#[test]
fn seven_plus_four_carries_the_five() {
    let instruction = generate_instruction(7, 11, None);
    assert_eq!(instruction.highlight_beads.len(), 3);
    assert!(instruction.highlight_beads.iter().any(|c| c.place_value == 1
        && c.bead_type == BeadType::Earth
        && c.direction == Direction::Activate));
    assert!(instruction.action_description.contains("7 + 4 = 7 + (5 - 1)"));
    assert!(instruction.validate().is_valid);
}

#[test]
fn ninety_nine_plus_one_cascades() {
    let sequence = generate_sequence(99, 100);
    assert_eq!(sequence.steps.len(), 3);
    assert!(sequence
        .full_decomposition
        .contains("99 + 1 = 99 + (100 - 90) - 9"));

    let first = sequence.steps[0].changes();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].place_value, 2);
    assert_eq!(first[0].bead_type, BeadType::Earth);
    assert_eq!(first[0].position, Some(0));
    assert_eq!(first[0].direction, Direction::Activate);

    for (step, place) in [(1, 1), (2, 0)] {
        let changes = sequence.steps[step].changes();
        assert_eq!(changes.len(), 5);
        assert!(changes
            .iter()
            .all(|c| c.place_value == place && c.direction == Direction::Deactivate));
        assert_eq!(
            changes.iter().filter(|c| c.bead_type == BeadType::Heaven).count(),
            1
        );
    }
    assert_eq!(sequence.final_value(), 100);
}

#[test]
fn same_digit_pattern_gives_same_shape() {
    let low = generate_instruction(3, 17, None);
    let high = generate_instruction(13, 27, None);
    assert_eq!(low.total_steps, high.total_steps);
    assert_eq!(low.total_steps, Some(3));
    assert_eq!(shapes(3, 17), shapes(13, 27));
}

#[test]
fn every_step_is_certified_on_the_grid() {
    for (start, target) in [(0, 9), (4, 9), (9, 10), (47, 53), (1_000, 1), (12_345, 54_321)] {
        let sequence = generate_sequence(start, target);
        assert!(sequence.is_valid(), "{start} -> {target}");

        let mut grid = BeadGrid::from_state(&to_state(start, 5)).expect("valid start");
        for step in &sequence.steps {
            grid.apply_all(&step.changes()).expect("legal step");
            assert_eq!(grid.value(), step.expected_value);
        }
        assert_eq!(grid.value(), target);
        assert_eq!(sequence.bead_total(), target - start);
    }
}

#[test]
fn segments_cover_every_step_once() {
    let sequence = generate_sequence(1_234, 8_765);
    let mut covered: Vec<usize> = sequence
        .segments
        .iter()
        .flat_map(|s| s.step_indices.iter().copied())
        .collect();
    covered.sort_unstable();
    assert_eq!(covered, (0..sequence.steps.len()).collect::<Vec<_>>());
    for segment in &sequence.segments {
        assert_eq!(
            segment.term_range.slice(&sequence.full_decomposition),
            segment.expression
        );
        assert!(!segment.title.is_empty());
        assert!(!segment.summary.is_empty());
    }
}

#[test]
fn over_capacity_instruction_is_flagged_by_validator() {
    let instruction = generate_instruction(99_999, 100_000, None);
    let result = instruction.validate();
    assert!(result.has(IssueCode::InvalidPlaceValue));
    assert!(result.messages().contains(&"Invalid place value: 5"));
}

#[test]
fn wider_planner_accepts_the_same_move() {
    let planner = Planner::new(AbacusConfig {
        columns: 6,
        ..AbacusConfig::default()
    })
    .expect("valid config");
    let sequence = planner.sequence(99_999, 100_000);
    assert!(sequence.is_valid());
    assert!(planner.instruction(99_999, 100_000, None).validate().is_valid);
}

#[test]
fn invalid_config_is_rejected() {
    let result = Planner::new(AbacusConfig {
        columns: 0,
        ..AbacusConfig::default()
    });
    assert!(result.is_err());
}
