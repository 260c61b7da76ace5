//! Complement decomposer.
//!
//! Decides, for one place, how an addend reaches the abacus:
//!
//! - **Direct**: the beads fit (or are present, for subtraction).
//! - **Five-complement**: `+a = +5 - (5 - a)` or `-a = +(5 - a) - 5`.
//! - **Ten-complement**: `+a = +10 - (10 - a)` or `-a = -10 + (10 - a)`,
//!   carrying to or borrowing from the next place.
//! - **Recursive complement**: the carry or borrow is itself not direct, so
//!   it is decomposed one place higher and the result wraps the remainder.
//!
//! [`classify`] is a pure function of `(digit, addend)`. [`decompose`] adds
//! the running value so carries can inspect the higher columns.
//!
//! # Five/ten tie-break
//!
//! An addition of `a <= 4` that overflows the column uses the
//! five-complement when the column holds more than `5 - a` earth beads
//! (`7 + 4 = 7 + (5 - 1)`); the overflowing five is carried by the bead diff
//! when the step is materialized. At exactly `d + a == 10` the earth beads
//! would all be cleared, and the ten-complement applies
//! (`9 + 1 = (10 - 9)`). [`decompose`] only keeps such a five-complement when
//! the next column takes the carry directly; otherwise it falls back to the
//! ten-complement (`97 + 4 = 97 + (100 - 90) - 6`).

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::codec::{digit_at, place_unit, ColumnState};

/// Signed digit movement at one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceMove {
    pub place: u32,
    /// Signed digit in `-9..=9`, never zero.
    pub digit: i8,
}

impl PlaceMove {
    pub fn new(place: u32, digit: i8) -> Self {
        Self { place, digit }
    }

    /// Value this move adds to the abacus.
    pub fn value(&self) -> i64 {
        i64::from(self.digit).saturating_mul(place_unit(self.place))
    }

    /// Unsigned magnitude as it appears in the equation (`90`, `5`).
    pub fn magnitude(&self) -> i64 {
        self.value().saturating_abs()
    }

    pub fn is_addition(&self) -> bool {
        self.digit > 0
    }
}

/// Arithmetic identity recorded by a complement, unscaled to the place.
///
/// `{ add_value: 5, subtract_value: 1 }` reads "add 5, take away 1".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub add_value: i64,
    pub subtract_value: i64,
}

/// Single-place classification of `digit + addend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Classification {
    Direct,
    FiveComplement(Identity),
    TenComplement(Identity),
}

/// Pedagogical rule names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    Direct,
    FiveComplement,
    TenComplement,
    Cascade,
}

/// Decomposition of one place's addend into performable moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Complement {
    Direct(PlaceMove),
    FiveComplement {
        addition: PlaceMove,
        removal: PlaceMove,
    },
    TenComplement {
        carry: PlaceMove,
        remainder: Box<Complement>,
    },
    RecursiveComplement {
        inner: Box<Complement>,
        remainder: Box<Complement>,
    },
}

impl Complement {
    /// Moves in narration order: higher places first, additions before
    /// removals within a place.
    pub fn moves(&self) -> Vec<PlaceMove> {
        let mut moves = Vec::new();
        self.collect_moves(&mut moves);
        moves
    }

    fn collect_moves(&self, out: &mut Vec<PlaceMove>) {
        match self {
            Complement::Direct(m) => out.push(*m),
            Complement::FiveComplement { addition, removal } => {
                out.push(*addition);
                out.push(*removal);
            }
            Complement::TenComplement { carry, remainder } => {
                out.push(*carry);
                remainder.collect_moves(out);
            }
            Complement::RecursiveComplement { inner, remainder } => {
                inner.collect_moves(out);
                remainder.collect_moves(out);
            }
        }
    }

    /// Sum of every move's value.
    pub fn net_value(&self) -> i64 {
        self.moves()
            .iter()
            .fold(0i64, |total, m| total.saturating_add(m.value()))
    }

    pub fn rule(&self) -> Rule {
        match self {
            Complement::Direct(_) => Rule::Direct,
            Complement::FiveComplement { .. } => Rule::FiveComplement,
            Complement::TenComplement { .. } => Rule::TenComplement,
            Complement::RecursiveComplement { .. } => Rule::Cascade,
        }
    }

    /// Nesting depth; a direct move has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Complement::Direct(_) => 0,
            Complement::FiveComplement { .. } => 1,
            Complement::TenComplement { remainder, .. } => 1 + remainder.depth(),
            Complement::RecursiveComplement { inner, remainder } => {
                1 + inner.depth().max(remainder.depth())
            }
        }
    }
}

/// Whether `addend` earth/heaven beads can be pushed to the bar as-is.
fn fits_directly(column: ColumnState, addend: u8) -> bool {
    if addend < 5 {
        column.earth_active + addend <= 4
    } else {
        !column.heaven_active && column.earth_active + (addend - 5) <= 4
    }
}

/// Whether `amount` can be pulled away from the bar as-is.
fn removable_directly(column: ColumnState, amount: u8) -> bool {
    if amount < 5 {
        column.earth_active >= amount
    } else {
        column.heaven_active && column.earth_active >= amount - 5
    }
}

/// Classify `digit + addend` at a single place.
///
/// Total over every integer pair: digits clamp to `0..=9`, addends to
/// `-9..=9`, and a zero addend is direct.
pub fn classify(digit: i64, addend: i64) -> Classification {
    let digit = digit.clamp(0, 9) as u8;
    let addend = addend.clamp(-9, 9) as i8;
    let column = ColumnState::from_digit(digit);

    if addend == 0 {
        return Classification::Direct;
    }

    let amount = addend.unsigned_abs();
    if addend > 0 {
        if fits_directly(column, amount) {
            return Classification::Direct;
        }
        let five = Identity {
            add_value: 5,
            subtract_value: i64::from(5 - amount.min(5)),
        };
        if digit + amount <= 9 {
            return Classification::FiveComplement(five);
        }
        if amount <= 4 && column.earth_active > 5 - amount {
            return Classification::FiveComplement(five);
        }
        Classification::TenComplement(Identity {
            add_value: 10,
            subtract_value: i64::from(10 - amount),
        })
    } else {
        if removable_directly(column, amount) {
            return Classification::Direct;
        }
        if digit >= amount {
            return Classification::FiveComplement(Identity {
                add_value: i64::from(5 - amount.min(5)),
                subtract_value: 5,
            });
        }
        Classification::TenComplement(Identity {
            add_value: i64::from(10 - amount),
            subtract_value: 10,
        })
    }
}

/// Decompose `addend` (a signed digit) at `place` of `running`.
///
/// `depth_budget` bounds how many places a carry or borrow may ripple; once
/// it is spent the carry stays undecomposed and the bead diff realizes it.
pub fn decompose(running: i64, place: u32, addend: i8, depth_budget: usize) -> Complement {
    let digit = digit_at(running, place);
    match classify(i64::from(digit), i64::from(addend)) {
        Classification::Direct => Complement::Direct(PlaceMove::new(place, addend)),
        Classification::FiveComplement(identity) => {
            // A five pushed past a lowered heaven bead carries into the next
            // column; that carry must itself be direct.
            let carries = addend > 0 && digit >= 5;
            if carries && !carry_is_direct(running, place, 1) {
                let amount = addend.unsigned_abs();
                let ten = Identity {
                    add_value: 10,
                    subtract_value: i64::from(10 - amount),
                };
                return ten_complement(running, place, addend, ten, depth_budget);
            }
            Complement::FiveComplement {
                addition: PlaceMove::new(place, identity.add_value as i8),
                removal: PlaceMove::new(place, -(identity.subtract_value as i8)),
            }
        }
        Classification::TenComplement(identity) => {
            ten_complement(running, place, addend, identity, depth_budget)
        }
    }
}

fn carry_is_direct(running: i64, place: u32, sign: i8) -> bool {
    let higher = digit_at(running, place + 1);
    classify(i64::from(higher), i64::from(sign)) == Classification::Direct
}

fn ten_complement(
    running: i64,
    place: u32,
    addend: i8,
    identity: Identity,
    depth_budget: usize,
) -> Complement {
    let digit = digit_at(running, place);
    let sign: i8 = if addend > 0 { 1 } else { -1 };
    // The carry lands one place up and leaves this digit untouched.
    let rest = if addend > 0 {
        -(identity.subtract_value as i8)
    } else {
        identity.add_value as i8
    };
    let remainder = Box::new(decompose_remainder(digit, place, rest));
    let carry = PlaceMove::new(place + 1, sign);

    if carry_is_direct(running, place, sign) {
        return Complement::TenComplement { carry, remainder };
    }
    if depth_budget == 0 {
        warn!(
            running,
            place,
            addend,
            "complement recursion cap reached; carry left to the bead diff"
        );
        return Complement::TenComplement { carry, remainder };
    }
    Complement::RecursiveComplement {
        inner: Box::new(decompose(running, place + 1, sign, depth_budget - 1)),
        remainder,
    }
}

/// The at-this-place half of a ten-complement. Never overflows the column
/// again, so it is either direct or a five-complement.
fn decompose_remainder(digit: u8, place: u32, rest: i8) -> Complement {
    match classify(i64::from(digit), i64::from(rest)) {
        Classification::FiveComplement(identity) => Complement::FiveComplement {
            addition: PlaceMove::new(place, identity.add_value as i8),
            removal: PlaceMove::new(place, -(identity.subtract_value as i8)),
        },
        _ => Complement::Direct(PlaceMove::new(place, rest)),
    }
}
