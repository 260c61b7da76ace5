//! Soroban error types.
//!
//! Generation never fails: expected edge cases come back as data (step
//! validity flags, validator issue lists). These errors cover the few places
//! where a caller hands us something that cannot be used at all.

use thiserror::Error;

use crate::codec::BeadType;

/// Configuration and value-range failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SorobanError {
    /// Configuration validation failure.
    #[error("Invalid abacus config: {0}")]
    InvalidConfig(String),
    /// A negative value cannot be shown on the abacus.
    #[error("Value {0} is negative")]
    NegativeValue(i64),
    /// The value needs more columns than the abacus has.
    #[error("Value {value} exceeds the {columns}-column capacity (max {max})")]
    ExceedsCapacity { value: i64, columns: usize, max: i64 },
    /// `target - start` does not fit in an `i64`.
    #[error("Difference between {start} and {target} overflows")]
    Overflow { start: i64, target: i64 },
}

/// Illegal physical bead toggle on a [`crate::grid::BeadGrid`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("Place {place} is outside the {columns}-column grid")]
    PlaceOutOfRange { place: u32, columns: usize },
    #[error("Earth position {position} does not exist (0..=3)")]
    PositionOutOfRange { position: u8 },
    #[error("Earth bead toggle at place {place} is missing its position")]
    MissingPosition { place: u32 },
    #[error("{bead_type:?} bead at place {place} is already {state}")]
    AlreadyInState {
        place: u32,
        bead_type: BeadType,
        state: &'static str,
    },
    #[error("Earth bead {position} at place {place} would leave a gap")]
    EarthGap { place: u32, position: u8 },
    #[error("Column at place {place} holds {earth} earth beads (max 4)")]
    EarthOverflow { place: u32, earth: u8 },
}

impl SorobanError {
    /// Create an ExceedsCapacity error for a column count.
    pub fn exceeds(value: i64, columns: usize, max: i64) -> Self {
        Self::ExceedsCapacity {
            value,
            columns,
            max,
        }
    }
}
