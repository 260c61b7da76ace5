//! Property tests for the abacus model.
//!
//! Values stay inside the default five-column abacus unless a property is
//! about out-of-range input.

use proptest::prelude::*;
use soroban_core::{
    diff_from_values, generate_instruction, generate_sequence, states_equal, to_state, to_value,
    validate_diff, BeadGrid, ColumnState, MAX_COLUMNS,
};
use soroban_tests::AbacusHarness;

fn abacus_value() -> impl Strategy<Value = i64> {
    0i64..=99_999
}

proptest! {
    #[test]
    fn round_trip(value in abacus_value()) {
        prop_assert_eq!(to_value(&to_state(value, 5)), value);
    }

    #[test]
    fn every_encoded_column_is_legal(value in any::<i64>(), columns in 1usize..=MAX_COLUMNS) {
        let state = to_state(value, columns);
        prop_assert_eq!(state.width(), columns);
        prop_assert!(state.columns().iter().all(ColumnState::is_valid));
    }

    #[test]
    fn identical_values_need_no_changes(value in abacus_value()) {
        let result = diff_from_values(value, value, 5);
        prop_assert!(!result.has_changes);
        prop_assert!(result.changes.is_empty());
    }

    #[test]
    fn applying_a_diff_reaches_the_target(from in abacus_value(), to in abacus_value()) {
        let result = diff_from_values(from, to, 5);
        let mut grid = BeadGrid::from_state(&result.from).expect("valid state");
        grid.apply_all(&result.changes).expect("legal toggles");
        prop_assert!(states_equal(&grid.to_state(), &to_state(to, 5)));
        prop_assert_eq!(result.signed_total(), to - from);
        prop_assert!(validate_diff(&result).is_valid);
    }

    #[test]
    fn bead_movements_conserve_the_difference(start in abacus_value(), target in abacus_value()) {
        let sequence = generate_sequence(start, target);
        prop_assert_eq!(sequence.bead_total(), target - start);
        prop_assert_eq!(sequence.final_value(), target);
        prop_assert!(sequence.is_valid());
    }

    #[test]
    fn every_intermediate_state_is_legal(start in abacus_value(), target in abacus_value()) {
        let mut harness = AbacusHarness::new(start, target);
        harness.run();
        prop_assert_eq!(harness.value(), target);
        prop_assert_eq!(harness.signed_total(), target - start);
        for state in harness.states() {
            prop_assert!(state.columns().iter().all(ColumnState::is_valid));
        }
    }

    #[test]
    fn generated_instructions_validate(start in abacus_value(), target in abacus_value()) {
        let result = generate_instruction(start, target, None).validate();
        prop_assert!(result.is_valid, "{:?}", result.messages());
    }

    #[test]
    fn term_offsets_point_at_their_numbers(start in abacus_value(), target in abacus_value()) {
        let sequence = generate_sequence(start, target);
        for step in &sequence.steps {
            let text = step.term_position.slice(&sequence.full_decomposition);
            prop_assert_eq!(text, step.mathematical_term.trim_start_matches('-'));
        }
    }

    #[test]
    fn generation_never_panics(start in any::<i64>(), target in any::<i64>()) {
        let sequence = generate_sequence(start, target);
        prop_assert!(!sequence.full_decomposition.is_empty());
        let _ = generate_instruction(start, target, Some("add"));
    }
}
