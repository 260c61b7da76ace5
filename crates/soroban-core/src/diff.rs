//! Bead diff engine.
//!
//! Computes the minimal ordered set of bead toggles turning one state into
//! another. Physical choreography rule: every deactivation (across all
//! places) comes before any activation, so the hand clears space before
//! adding beads. Earth beads are added lowest position first and removed
//! highest active position first.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::codec::{place_unit, to_state, BeadState, BeadType, ColumnState};

/// Direction of a single bead toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Move the bead to the bar.
    Activate,
    /// Move the bead away from the bar.
    Deactivate,
}

impl Direction {
    fn verb(self) -> &'static str {
        match self {
            Direction::Activate => "add",
            Direction::Deactivate => "remove",
        }
    }
}

/// A single bead toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeadChange {
    pub place_value: u32,
    pub bead_type: BeadType,
    /// Earth bead position (0 nearest the bar); `None` for heaven beads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u8>,
    pub direction: Direction,
    /// Dense 0-based application order.
    pub order: usize,
}

impl BeadChange {
    /// Signed value this toggle adds to the abacus.
    pub fn signed_value(&self) -> i64 {
        let value = self.bead_type.unit().saturating_mul(place_unit(self.place_value));
        match self.direction {
            Direction::Activate => value,
            Direction::Deactivate => -value,
        }
    }

    /// Whether two changes move the same bead the same way, ignoring order.
    pub fn same_movement(&self, other: &BeadChange) -> bool {
        self.place_value == other.place_value
            && self.bead_type == other.bead_type
            && self.position == other.position
            && self.direction == other.direction
    }
}

/// Result of diffing two bead states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeadDiff {
    pub from: BeadState,
    pub to: BeadState,
    pub changes: Vec<BeadChange>,
    pub summary: String,
    pub has_changes: bool,
}

impl BeadDiff {
    /// Sum of the signed bead values of every change.
    pub fn signed_total(&self) -> i64 {
        signed_total(&self.changes)
    }
}

/// One hop of a checkpoint chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStep {
    pub step_index: usize,
    pub from_value: i64,
    pub to_value: i64,
    pub diff: BeadDiff,
}

/// Sum of signed bead values over a change list.
pub fn signed_total(changes: &[BeadChange]) -> i64 {
    changes
        .iter()
        .fold(0i64, |total, change| total.saturating_add(change.signed_value()))
}

/// Diff two bead states.
pub fn diff(from: &BeadState, to: &BeadState) -> BeadDiff {
    let width = from.width().max(to.width()) as u32;
    let mut removals = Vec::new();
    let mut additions = Vec::new();

    for place in 0..width {
        let (before, after) = (from.column(place), to.column(place));
        if before != after {
            column_changes(place, before, after, &mut removals, &mut additions);
        }
    }

    let changes: Vec<BeadChange> = removals
        .into_iter()
        .chain(additions)
        .enumerate()
        .map(|(order, change)| BeadChange { order, ..change })
        .collect();

    BeadDiff {
        from: from.clone(),
        to: to.clone(),
        has_changes: !changes.is_empty(),
        summary: summarize(&changes),
        changes,
    }
}

/// Diff two integers encoded on `columns` rods.
pub fn diff_from_values(from: i64, to: i64, columns: usize) -> BeadDiff {
    diff(&to_state(from, columns), &to_state(to, columns))
}

/// Diff every hop of `start -> checkpoints[0] -> checkpoints[1] -> ...`.
pub fn diff_chain(start: i64, checkpoints: &[i64], columns: usize) -> Vec<ChainStep> {
    let mut previous = start;
    checkpoints
        .iter()
        .enumerate()
        .map(|(step_index, &value)| {
            let step = ChainStep {
                step_index,
                from_value: previous,
                to_value: value,
                diff: diff_from_values(previous, value, columns),
            };
            previous = value;
            step
        })
        .collect()
}

fn column_changes(
    place: u32,
    before: ColumnState,
    after: ColumnState,
    removals: &mut Vec<BeadChange>,
    additions: &mut Vec<BeadChange>,
) {
    let toggle = |bead_type, position, direction| BeadChange {
        place_value: place,
        bead_type,
        position,
        direction,
        order: 0,
    };

    if before.heaven_active != after.heaven_active {
        if after.heaven_active {
            additions.push(toggle(BeadType::Heaven, None, Direction::Activate));
        } else {
            removals.push(toggle(BeadType::Heaven, None, Direction::Deactivate));
        }
    }

    if after.earth_active > before.earth_active {
        for position in before.earth_active..after.earth_active {
            additions.push(toggle(BeadType::Earth, Some(position), Direction::Activate));
        }
    } else {
        // Last added, first removed.
        for position in (after.earth_active..before.earth_active).rev() {
            removals.push(toggle(BeadType::Earth, Some(position), Direction::Deactivate));
        }
    }
}

/// Human name of a column.
pub fn place_name(place: u32) -> String {
    const NAMES: [&str; 7] = [
        "ones",
        "tens",
        "hundreds",
        "thousands",
        "ten-thousands",
        "hundred-thousands",
        "millions",
    ];
    match NAMES.get(place as usize) {
        Some(name) => (*name).to_string(),
        None => format!("10^{place}"),
    }
}

/// Bead counts for one `(place, direction)` group.
#[derive(Debug, Default)]
struct Tally {
    heaven: usize,
    earth: usize,
}

impl Tally {
    fn record(&mut self, bead_type: BeadType) {
        match bead_type {
            BeadType::Heaven => self.heaven += 1,
            BeadType::Earth => self.earth += 1,
        }
    }

    fn beads(&self) -> String {
        let mut parts = Vec::new();
        if self.heaven > 0 {
            parts.push("heaven bead".to_string());
        }
        if self.earth > 0 {
            let plural = if self.earth == 1 { "" } else { "s" };
            parts.push(format!("{} earth bead{plural}", self.earth));
        }
        parts.join(" and ")
    }
}

/// Group changes by direction and place into one sentence, in change order.
///
/// `"remove 1 earth bead in ones column, then add heaven bead in ones column"`
pub fn summarize(changes: &[BeadChange]) -> String {
    if changes.is_empty() {
        return "No changes needed".to_string();
    }

    let mut phases: IndexMap<Direction, IndexMap<u32, Tally>> = IndexMap::new();
    for change in changes {
        phases
            .entry(change.direction)
            .or_default()
            .entry(change.place_value)
            .or_default()
            .record(change.bead_type);
    }

    phases
        .iter()
        .map(|(direction, places)| {
            places
                .iter()
                .map(|(place, tally)| {
                    format!(
                        "{} {} in {} column",
                        direction.verb(),
                        tally.beads(),
                        place_name(*place)
                    )
                })
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect::<Vec<_>>()
        .join(", then ")
}

/// Short description of changes confined to one place and direction.
///
/// `"add heaven bead"`, `"remove 2 earth beads in tens column"`. Falls back to
/// [`summarize`] when the changes span places or directions.
pub fn describe_short(changes: &[BeadChange]) -> String {
    let Some(first) = changes.first() else {
        return "No change needed".to_string();
    };
    let uniform = changes
        .iter()
        .all(|c| c.place_value == first.place_value && c.direction == first.direction);
    if !uniform {
        return summarize(changes);
    }

    let mut tally = Tally::default();
    changes.iter().for_each(|c| tally.record(c.bead_type));
    let mut text = format!("{} {}", first.direction.verb(), tally.beads());
    if first.place_value > 0 {
        text.push_str(&format!(" in {} column", place_name(first.place_value)));
    }
    text
}

/// Bead phrase for changes at one place and direction: `"heaven bead and 3 earth beads"`.
pub(crate) fn bead_phrase(changes: &[BeadChange]) -> String {
    let mut tally = Tally::default();
    changes.iter().for_each(|c| tally.record(c.bead_type));
    tally.beads()
}
