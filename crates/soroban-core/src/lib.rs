//! Soroban core: arithmetic decomposition on a Japanese abacus.
//!
//! Given a start and a target value, this crate produces the ordered bead
//! movements a learner makes to get from one to the other, and the
//! pedagogical equation that narrates them (`"3 + 4 = 3 + (5 - 1) = 7"`).
//!
//! # Components
//!
//! - [`codec`]: integers to per-place bead states and back
//! - [`diff`]: minimal ordered bead toggles between two states
//! - [`complement`]: direct, five-, ten- and recursive-complement decisions
//! - [`sequence`]: the narrated step sequence with equation offsets
//! - [`instruction`]: the compact tutorial instruction form
//! - [`validate`]: structural checks on instructions and diffs
//! - [`grid`]: a fixed-size physical bead model used to certify steps
//!
//! Everything is computed on demand from `(start, target)`; nothing is
//! cached or mutated after creation, so every type is `Send + Sync`.
//!
//! ```
//! use soroban_core::generate_sequence;
//!
//! let sequence = generate_sequence(3, 7);
//! assert_eq!(sequence.full_decomposition, "3 + 4 = 3 + (5 - 1) = 7");
//! assert_eq!(sequence.final_value(), 7);
//! ```

pub mod codec;
pub mod complement;
pub mod config;
pub mod diff;
pub mod error;
pub mod grid;
pub mod instruction;
pub mod sequence;
pub mod validate;

pub use codec::{
    digit_at, digit_count, place_unit, states_equal, to_state, to_value, validate_value,
    BeadState, BeadType, ColumnState, EARTH_BEADS,
};
pub use complement::{
    classify, decompose, Classification, Complement, Identity, PlaceMove, Rule,
};
pub use config::{AbacusConfig, DEFAULT_COLUMNS, MAX_COLUMNS};
pub use diff::{
    describe_short, diff, diff_chain, diff_from_values, place_name, summarize, BeadChange,
    BeadDiff, ChainStep, Direction,
};
pub use error::{ApplyError, SorobanError};
pub use grid::BeadGrid;
pub use instruction::{generate_instruction, ExpectedAction, Instruction};
pub use sequence::{
    generate_sequence, DecompositionTerm, PedagogicalSegment, PlaceDecomposition, Planner,
    StepBeadHighlight, TermPosition, UnifiedSequence, UnifiedStep,
};
pub use validate::{
    validate_bead_diff, validate_diff, validate_instruction, validate_instruction_with,
    IssueCode, Validation, ValidationIssue,
};

#[cfg(test)]
mod tests;
