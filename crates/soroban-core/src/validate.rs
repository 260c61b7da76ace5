//! Structural validation of instructions and bead diffs.
//!
//! Validation never fails: every problem becomes a [`ValidationIssue`] in the
//! returned [`Validation`], and is logged through `tracing::warn!` so it shows
//! up without the caller having to print it.
//!
//! # Issue codes
//!
//! - Instructions: `InvalidPlaceValue`, `MissingStepInstructions`,
//!   `StepIndexOutOfRange`, `UncoveredHighlight`
//! - Diffs and states: `ColumnOverflow`, `InvalidPosition`, `NonDenseOrder`,
//!   `AdditionBeforeRemoval`, `HasChangesMismatch`, `ReplayFailed`,
//!   `ReplayMismatch`

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::codec::{states_equal, BeadState, BeadType, EARTH_BEADS};
use crate::config::AbacusConfig;
use crate::diff::{diff, BeadChange, BeadDiff, Direction};
use crate::grid::BeadGrid;
use crate::instruction::{ExpectedAction, Instruction};

/// Issue categories, for filtering and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueCode {
    /// A highlighted bead sits on a rod the abacus does not have.
    InvalidPlaceValue,
    /// A multi-step instruction has no step lines.
    MissingStepInstructions,
    /// A step highlight points past the last step line.
    StepIndexOutOfRange,
    /// A highlighted bead has no matching step highlight.
    UncoveredHighlight,
    /// A column holds more than four earth beads.
    ColumnOverflow,
    /// An earth change without a valid position, or a heaven change with one.
    InvalidPosition,
    /// Change orders are not `0, 1, 2, ...`.
    NonDenseOrder,
    /// An activation is ordered before a deactivation.
    AdditionBeforeRemoval,
    /// `has_changes` disagrees with the change list.
    HasChangesMismatch,
    /// A change could not be applied to the bead grid.
    ReplayFailed,
    /// Replaying the changes does not reach the target state.
    ReplayMismatch,
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validation outcome: `is_valid` is true exactly when `issues` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl Validation {
    /// Issue messages, in the order they were found.
    pub fn messages(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.message.as_str()).collect()
    }

    /// Whether any issue carries `code`.
    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

/// Collects issues and logs each as it is found.
#[derive(Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn push(&mut self, code: IssueCode, message: String) {
        warn!(code = ?code, "{}", message);
        self.0.push(ValidationIssue { code, message });
    }

    fn finish(self) -> Validation {
        Validation {
            is_valid: self.0.is_empty(),
            issues: self.0,
        }
    }
}

/// Validate an instruction against the default configuration.
pub fn validate_instruction(instruction: &Instruction) -> Validation {
    validate_instruction_with(instruction, &AbacusConfig::default())
}

/// Validate an instruction against `config`.
pub fn validate_instruction_with(instruction: &Instruction, config: &AbacusConfig) -> Validation {
    let mut issues = Issues::default();

    for bead in &instruction.highlight_beads {
        if bead.place_value as usize >= config.columns {
            issues.push(
                IssueCode::InvalidPlaceValue,
                format!("Invalid place value: {}", bead.place_value),
            );
        }
    }

    let step_lines = instruction
        .multi_step_instructions
        .as_ref()
        .map_or(0, Vec::len);
    if instruction.expected_action == ExpectedAction::MultiStep && step_lines == 0 {
        issues.push(
            IssueCode::MissingStepInstructions,
            "Multi-step action without step instructions".to_string(),
        );
    }

    if let Some(highlights) = &instruction.step_bead_highlights {
        for highlight in highlights {
            if highlight.step_index >= step_lines {
                issues.push(
                    IssueCode::StepIndexOutOfRange,
                    format!(
                        "Step index {} is out of range ({step_lines} step instructions)",
                        highlight.step_index
                    ),
                );
            }
        }

        // Each step highlight may account for one highlighted bead.
        let mut unused: Vec<&BeadChange> = highlights.iter().map(|h| &h.change).collect();
        for bead in &instruction.highlight_beads {
            match unused.iter().position(|c| c.same_movement(bead)) {
                Some(index) => {
                    unused.swap_remove(index);
                }
                None => issues.push(
                    IssueCode::UncoveredHighlight,
                    format!(
                        "Highlighted {:?} bead at place {} has no step highlight",
                        bead.bead_type, bead.place_value
                    ),
                ),
            }
        }
    }

    issues.finish()
}

fn check_capacity(state: &BeadState, label: &str, issues: &mut Issues) {
    for (place, column) in state.iter() {
        if !column.is_valid() {
            issues.push(
                IssueCode::ColumnOverflow,
                format!(
                    "{label} state column {place} has {} earth beads (max {EARTH_BEADS})",
                    column.earth_active
                ),
            );
        }
    }
}

/// Validate a bead diff: endpoint capacity, positions, ordering and replay.
pub fn validate_diff(bead_diff: &BeadDiff) -> Validation {
    let mut issues = Issues::default();
    check_capacity(&bead_diff.from, "Source", &mut issues);
    check_capacity(&bead_diff.to, "Target", &mut issues);

    for change in &bead_diff.changes {
        let position_ok = match change.bead_type {
            BeadType::Heaven => change.position.is_none(),
            BeadType::Earth => change.position.is_some_and(|p| p < EARTH_BEADS),
        };
        if !position_ok {
            issues.push(
                IssueCode::InvalidPosition,
                format!(
                    "{:?} bead change at place {} has position {:?}",
                    change.bead_type, change.place_value, change.position
                ),
            );
        }
    }

    if let Some((index, change)) = bead_diff
        .changes
        .iter()
        .enumerate()
        .find(|(index, change)| change.order != *index)
    {
        issues.push(
            IssueCode::NonDenseOrder,
            format!("Change {index} has order {}", change.order),
        );
    }

    let first_addition = bead_diff
        .changes
        .iter()
        .position(|c| c.direction == Direction::Activate);
    if let Some(first) = first_addition {
        if bead_diff.changes[first..]
            .iter()
            .any(|c| c.direction == Direction::Deactivate)
        {
            issues.push(
                IssueCode::AdditionBeforeRemoval,
                "Bead removals must come before additions".to_string(),
            );
        }
    }

    if bead_diff.has_changes == bead_diff.changes.is_empty() {
        issues.push(
            IssueCode::HasChangesMismatch,
            format!(
                "hasChanges is {} but there are {} changes",
                bead_diff.has_changes,
                bead_diff.changes.len()
            ),
        );
    }

    replay(bead_diff, &mut issues);
    issues.finish()
}

fn replay(bead_diff: &BeadDiff, issues: &mut Issues) {
    let width = bead_diff.from.width().max(bead_diff.to.width()) as u32;
    let padded = BeadState::from_columns((0..width).map(|p| bead_diff.from.column(p)).collect());
    let mut grid = match BeadGrid::from_state(&padded) {
        Ok(grid) => grid,
        // Already reported as a capacity issue.
        Err(_) => return,
    };
    if let Err(err) = grid.apply_all(&bead_diff.changes) {
        issues.push(IssueCode::ReplayFailed, err.to_string());
        return;
    }
    if !states_equal(&grid.to_state(), &bead_diff.to) {
        issues.push(
            IssueCode::ReplayMismatch,
            "Replaying the changes does not reach the target state".to_string(),
        );
    }
}

/// Validate two supplied states and the diff between them.
pub fn validate_bead_diff(from: &BeadState, to: &BeadState) -> Validation {
    validate_diff(&diff(from, to))
}
