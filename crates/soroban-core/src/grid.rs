//! Fixed-size physical bead model.
//!
//! Each column is a `[bool; 5]`: slot 0 is the heaven bead, slots 1..=4 are
//! earth positions 0..3 counted from the bar. Looking a bead up is an index,
//! and a fifth earth bead has nowhere to live.

use crate::codec::{BeadState, BeadType, ColumnState, EARTH_BEADS};
use crate::diff::{BeadChange, Direction};
use crate::error::ApplyError;

const SLOTS: usize = 1 + EARTH_BEADS as usize;

/// Physical abacus that replays bead toggles one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeadGrid {
    columns: Vec<[bool; SLOTS]>,
}

impl BeadGrid {
    /// Build a grid from a state, rejecting over-full columns.
    pub fn from_state(state: &BeadState) -> Result<Self, ApplyError> {
        let columns = state
            .iter()
            .map(|(place, column)| {
                if !column.is_valid() {
                    return Err(ApplyError::EarthOverflow {
                        place,
                        earth: column.earth_active,
                    });
                }
                let mut slots = [false; SLOTS];
                slots[0] = column.heaven_active;
                for slot in slots.iter_mut().skip(1).take(column.earth_active as usize) {
                    *slot = true;
                }
                Ok(slots)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    fn slot(bead_type: BeadType, position: Option<u8>) -> Option<usize> {
        match (bead_type, position) {
            (BeadType::Heaven, _) => Some(0),
            (BeadType::Earth, Some(position)) if position < EARTH_BEADS => {
                Some(1 + position as usize)
            }
            (BeadType::Earth, _) => None,
        }
    }

    /// Whether a bead is against the bar. Unknown beads read as inactive.
    pub fn is_active(&self, place: u32, bead_type: BeadType, position: Option<u8>) -> bool {
        match (self.columns.get(place as usize), Self::slot(bead_type, position)) {
            (Some(column), Some(slot)) => column[slot],
            _ => false,
        }
    }

    /// Toggle one bead, enforcing the physical rules.
    pub fn apply(&mut self, change: &BeadChange) -> Result<(), ApplyError> {
        let place = change.place_value;
        let width = self.columns.len();
        let column = self
            .columns
            .get_mut(place as usize)
            .ok_or(ApplyError::PlaceOutOfRange {
                place,
                columns: width,
            })?;

        let slot = match (change.bead_type, change.position) {
            (BeadType::Earth, None) => return Err(ApplyError::MissingPosition { place }),
            (BeadType::Earth, Some(position)) if position >= EARTH_BEADS => {
                return Err(ApplyError::PositionOutOfRange { position });
            }
            (bead_type, position) => {
                Self::slot(bead_type, position).ok_or(ApplyError::MissingPosition { place })?
            }
        };

        let activate = change.direction == Direction::Activate;
        if column[slot] == activate {
            return Err(ApplyError::AlreadyInState {
                place,
                bead_type: change.bead_type,
                state: if activate { "active" } else { "inactive" },
            });
        }

        if slot > 0 {
            // Earth beads slide as a stack: nothing below may be missing when
            // adding, nothing above may remain when removing.
            let gap = if activate {
                column[1..slot].iter().any(|active| !active)
            } else {
                column[slot + 1..].iter().any(|active| *active)
            };
            if gap {
                return Err(ApplyError::EarthGap {
                    place,
                    position: (slot - 1) as u8,
                });
            }
        }

        column[slot] = activate;
        Ok(())
    }

    /// Apply a list of changes in order.
    pub fn apply_all(&mut self, changes: &[BeadChange]) -> Result<(), ApplyError> {
        changes.iter().try_for_each(|change| self.apply(change))
    }

    /// Current state of the grid.
    pub fn to_state(&self) -> BeadState {
        BeadState::from_columns(
            self.columns
                .iter()
                .map(|slots| ColumnState {
                    heaven_active: slots[0],
                    earth_active: slots[1..].iter().filter(|active| **active).count() as u8,
                })
                .collect(),
        )
    }

    /// Current value of the grid.
    pub fn value(&self) -> i64 {
        crate::codec::to_value(&self.to_state())
    }
}
