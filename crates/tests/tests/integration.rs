//! Integration tests for end-to-end soroban sequences.
//!
//! These tests verify the full pipeline:
//! Plan → Replay on the bead grid → Verify

use soroban_core::{
    generate_instruction, AbacusConfig, BeadType, Direction, ExpectedAction, Rule,
};
use soroban_tests::AbacusHarness;

/// A five-complement replays as two physical steps.
#[test]
fn test_five_complement_replays() {
    let mut harness = AbacusHarness::new(3, 7);
    assert_eq!(harness.step(), 1);
    assert_eq!(harness.value(), 8);
    assert_eq!(harness.expected_value(), 8);
    assert_eq!(harness.step(), 1);
    assert_eq!(harness.value(), 7);
    assert!(harness.is_finished());
    assert_eq!(harness.signed_total(), 4);
}

/// `7 + 4` narrates a five-complement whose heaven bead is already down, so
/// the five carries into the tens column.
#[test]
fn test_five_complement_with_carry() {
    let mut harness = AbacusHarness::new(7, 11);
    harness.run();
    assert_eq!(harness.value(), 11);

    let sequence = harness.sequence();
    assert_eq!(sequence.full_decomposition, "7 + 4 = 7 + (5 - 1) = 11");
    assert_eq!(sequence.segments[0].rule, Rule::FiveComplement);
    assert!(sequence.segments[0].summary.contains("carries into the tens column"));

    let carry = sequence.steps[0].changes();
    assert_eq!(carry.len(), 2);
    assert_eq!(carry[0].bead_type, BeadType::Heaven);
    assert_eq!(carry[0].direction, Direction::Deactivate);
    assert_eq!((carry[1].place_value, carry[1].direction), (1, Direction::Activate));
}

/// A five that would ripple through a full tens column is decomposed as a
/// cascade instead, so each step stays within one column.
#[test]
fn test_carried_five_through_nines() {
    let mut harness = AbacusHarness::new(97, 101);
    assert_eq!(harness.width(), 5);
    assert_eq!(harness.step(), 1);
    assert_eq!(harness.value(), 197);
    assert_eq!(harness.step(), 5);
    assert_eq!(harness.value(), 107);
    assert_eq!(harness.step(), 2);
    assert_eq!(harness.value(), 101);
    assert!(harness.is_finished());
    assert_eq!(harness.sequence().segments[0].rule, Rule::Cascade);
}

/// Chains of nines cascade one place at a time.
#[test]
fn test_cascade_through_nines() {
    let mut harness = AbacusHarness::new(999, 1_000);
    harness.run();
    assert_eq!(harness.value(), 1_000);

    let sequence = harness.sequence();
    assert_eq!(
        sequence.full_decomposition,
        "999 + 1 = 999 + (1000 - 900) - 90 - 9 = 1000"
    );
    assert_eq!(sequence.steps.len(), 4);
    assert_eq!(sequence.segments[0].rule, Rule::Cascade);
}

/// Borrowing through zeros mirrors the carry cascade.
#[test]
fn test_borrow_through_zeros() {
    let mut harness = AbacusHarness::new(1_000, 999);
    harness.run();
    assert_eq!(harness.value(), 999);
    assert_eq!(
        harness.sequence().full_decomposition,
        "1000 - 1 = 1000 - (1000 - 900) + 90 + 9 = 999"
    );
}

/// Multi-digit addition decomposes each digit highest place first.
#[test]
fn test_multi_digit_addition() {
    let mut harness = AbacusHarness::new(1_234, 5_678);
    harness.run();
    assert_eq!(harness.value(), 5_678);

    let places: Vec<u32> = harness.sequence().segments.iter().map(|s| s.place).collect();
    assert_eq!(places, vec![3, 2, 1, 0]);
}

/// Values that spill past the configured rods still replay on a wide grid,
/// but the steps that touch the missing rods are flagged.
#[test]
fn test_over_capacity_is_flagged_but_replayable() {
    let config = AbacusConfig {
        columns: 2,
        ..AbacusConfig::default()
    };
    let mut harness = AbacusHarness::with_config(95, 105, config);
    assert_eq!(harness.width(), 3);
    harness.run();
    assert_eq!(harness.value(), 105);
    assert!(!harness.sequence().is_valid());
}

/// Negative inputs degrade to a single flagged step with no beads.
#[test]
fn test_negative_input_degrades() {
    let mut harness = AbacusHarness::new(5, -5);
    assert_eq!(harness.step(), 0);
    assert!(harness.is_finished());
    assert_eq!(harness.value(), 5);
    assert!(!harness.sequence().steps[0].is_valid);
}

/// Instructions round-trip through JSON in the tutorial wire shape.
#[test]
fn test_instruction_json_shape() {
    let instruction = generate_instruction(99, 100, Some("addition"));
    assert_eq!(instruction.expected_action, ExpectedAction::MultiStep);

    let json = serde_json::to_value(&instruction).expect("serializable");
    assert_eq!(json["expectedAction"], "multi-step");
    assert_eq!(json["legacyLabel"], "addition");
    assert_eq!(json["highlightBeads"][0]["placeValue"], 2);
    assert_eq!(json["highlightBeads"][0]["beadType"], "earth");
    assert_eq!(json["highlightBeads"][0]["direction"], "activate");
    assert_eq!(json["stepBeadHighlights"][0]["stepIndex"], 0);
    assert_eq!(json["stepBeadHighlights"][0]["position"], 0);

    let back: soroban_core::Instruction =
        serde_json::from_value(json).expect("deserializable");
    assert_eq!(back, instruction);
}
