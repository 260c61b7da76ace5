//! State codec: integers to per-place bead states and back.
//!
//! A column shows one decimal digit as `5 * heaven + earth`, with at most
//! four earth beads. A [`BeadState`] is indexed by place value (0 = ones).

use serde::{Deserialize, Serialize};

use crate::config::MAX_COLUMNS;
use crate::error::SorobanError;

/// Number of earth beads below the bar.
pub const EARTH_BEADS: u8 = 4;

/// Which bead of a column a change refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeadType {
    /// The single bead above the bar, worth 5.
    Heaven,
    /// One of the four beads below the bar, worth 1 each.
    Earth,
}

impl BeadType {
    /// Unscaled value of one bead of this type.
    pub const fn unit(self) -> i64 {
        match self {
            BeadType::Heaven => 5,
            BeadType::Earth => 1,
        }
    }
}

/// Bead configuration of a single column.
///
/// Fields are public so hand-built or deserialized states can be checked by
/// the validator; values produced by this crate always satisfy
/// `earth_active <= 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnState {
    pub heaven_active: bool,
    pub earth_active: u8,
}

impl ColumnState {
    /// A column with no beads against the bar.
    pub const EMPTY: ColumnState = ColumnState {
        heaven_active: false,
        earth_active: 0,
    };

    /// Column showing `digit`. Digits above 9 are clamped.
    pub fn from_digit(digit: u8) -> Self {
        let digit = digit.min(9);
        Self {
            heaven_active: digit >= 5,
            earth_active: digit % 5,
        }
    }

    /// Digit shown by this column. Saturates on hand-built over-full columns.
    pub fn digit(&self) -> u8 {
        (u8::from(self.heaven_active) * 5).saturating_add(self.earth_active)
    }

    /// Unscaled column value, exact even for over-full columns.
    fn weight(&self) -> i64 {
        i64::from(self.heaven_active) * 5 + i64::from(self.earth_active)
    }

    /// Whether the column respects the four-earth-bead capacity.
    pub fn is_valid(&self) -> bool {
        self.earth_active <= EARTH_BEADS
    }

    /// Earth beads still free to move up to the bar.
    pub fn earth_free(&self) -> u8 {
        EARTH_BEADS.saturating_sub(self.earth_active)
    }
}

/// Bead configuration of a whole abacus, one entry per column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeadState {
    columns: Vec<ColumnState>,
}

impl BeadState {
    /// Build a state from columns ordered by place value (ones first).
    pub fn from_columns(columns: Vec<ColumnState>) -> Self {
        Self { columns }
    }

    /// An all-clear state with `width` columns.
    pub fn empty(width: usize) -> Self {
        Self {
            columns: vec![ColumnState::EMPTY; width],
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column at `place`; places beyond the width read as empty.
    pub fn column(&self, place: u32) -> ColumnState {
        self.columns
            .get(place as usize)
            .copied()
            .unwrap_or(ColumnState::EMPTY)
    }

    /// Columns ordered by place value.
    pub fn columns(&self) -> &[ColumnState] {
        &self.columns
    }

    /// Iterate `(place, column)` pairs, ones first.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &ColumnState)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(place, column)| (place as u32, column))
    }
}

/// `10^place`, saturating at `i64::MAX`.
pub fn place_unit(place: u32) -> i64 {
    10i64.saturating_pow(place)
}

/// Decimal digit of `|value|` at `place`.
pub fn digit_at(value: i64, place: u32) -> u8 {
    match 10u64.checked_pow(place) {
        Some(unit) => ((value.unsigned_abs() / unit) % 10) as u8,
        None => 0,
    }
}

/// Number of decimal digits in `|value|` (zero has one digit).
pub fn digit_count(value: i64) -> u32 {
    value.unsigned_abs().checked_ilog10().map_or(1, |log| log + 1)
}

/// Encode `value` onto `columns` rods.
///
/// Negative values encode as zero and digits beyond the top column are
/// dropped; use [`validate_value`] first when that matters.
pub fn to_state(value: i64, columns: usize) -> BeadState {
    let value = value.max(0);
    let columns = columns.min(MAX_COLUMNS + 1);
    let mut state = Vec::with_capacity(columns);
    let mut remaining = value;
    for _ in 0..columns {
        state.push(ColumnState::from_digit((remaining % 10) as u8));
        remaining /= 10;
    }
    BeadState::from_columns(state)
}

/// Decode a state back to its integer value.
pub fn to_value(state: &BeadState) -> i64 {
    state.iter().fold(0i64, |total, (place, column)| {
        total.saturating_add(column.weight().saturating_mul(place_unit(place)))
    })
}

/// Check that `value` can be shown on `columns` rods.
pub fn validate_value(value: i64, columns: usize) -> Result<(), SorobanError> {
    if value < 0 {
        return Err(SorobanError::NegativeValue(value));
    }
    let max = 10i64.saturating_pow(columns.min(MAX_COLUMNS) as u32) - 1;
    if value > max {
        return Err(SorobanError::exceeds(value, columns, max));
    }
    Ok(())
}

/// Structural equality; missing trailing columns compare as empty.
pub fn states_equal(a: &BeadState, b: &BeadState) -> bool {
    let width = a.width().max(b.width()) as u32;
    (0..width).all(|place| a.column(place) == b.column(place))
}
