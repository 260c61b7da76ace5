//! Tutorial instructions.
//!
//! An [`Instruction`] is the compact form the tutorial player consumes: the
//! beads to highlight, the action the learner is expected to take and a
//! description. Multi-step instructions also carry one line per step and the
//! step each highlighted bead belongs to.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diff::{describe_short, BeadChange};
use crate::sequence::{Planner, StepBeadHighlight};
use crate::validate::{validate_instruction, Validation};

/// What the learner is expected to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpectedAction {
    Add,
    Subtract,
    MultiStep,
}

/// Instruction for moving the abacus from one value to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub highlight_beads: Vec<BeadChange>,
    pub expected_action: ExpectedAction,
    pub action_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_step_instructions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_bead_highlights: Option<Vec<StepBeadHighlight>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<usize>,
    /// Caller-supplied operation label, kept for display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_label: Option<String>,
}

impl Instruction {
    /// Structural checks against the default configuration.
    pub fn validate(&self) -> Validation {
        validate_instruction(self)
    }
}

/// Does a legacy label name the same direction as the computed action?
fn label_agrees(label: &str, action: ExpectedAction) -> bool {
    let label = label.trim().to_ascii_lowercase();
    match action {
        ExpectedAction::Add => label.starts_with("add") || label == "+",
        ExpectedAction::Subtract => label.starts_with("sub") || label == "-",
        ExpectedAction::MultiStep => label.starts_with("multi"),
    }
}

impl Planner {
    /// Build the instruction for `start -> target`.
    ///
    /// `legacy_label` is stored as-is and never consulted for the arithmetic.
    pub fn instruction(&self, start: i64, target: i64, legacy_label: Option<&str>) -> Instruction {
        let legacy_label = legacy_label.map(str::to_string);
        if start == target {
            return Instruction {
                highlight_beads: Vec::new(),
                expected_action: ExpectedAction::Add,
                action_description: "No change needed".to_string(),
                multi_step_instructions: None,
                step_bead_highlights: None,
                total_steps: None,
                legacy_label,
            };
        }

        let direction = if target > start {
            ExpectedAction::Add
        } else {
            ExpectedAction::Subtract
        };
        if let Some(label) = legacy_label.as_deref() {
            if !label_agrees(label, direction) {
                debug!(
                    label,
                    computed = ?direction,
                    "legacy label disagrees with recomputed action"
                );
            }
        }

        let sequence = self.sequence(start, target);
        if let [step] = sequence.steps.as_slice() {
            let beads = step.changes();
            let action_description = if beads.is_empty() {
                step.english_instruction.clone()
            } else {
                describe_short(&beads)
            };
            return Instruction {
                highlight_beads: beads,
                expected_action: direction,
                action_description,
                multi_step_instructions: None,
                step_bead_highlights: None,
                total_steps: None,
                legacy_label,
            };
        }

        // One application order across the whole instruction.
        let tagged: Vec<StepBeadHighlight> = sequence
            .steps
            .iter()
            .flat_map(|step| &step.bead_movements)
            .enumerate()
            .map(|(order, h)| StepBeadHighlight {
                change: BeadChange { order, ..h.change },
                step_index: h.step_index,
            })
            .collect();

        Instruction {
            highlight_beads: tagged.iter().map(|h| h.change).collect(),
            expected_action: ExpectedAction::MultiStep,
            action_description: sequence.full_decomposition.clone(),
            multi_step_instructions: Some(
                sequence
                    .steps
                    .iter()
                    .map(|step| step.english_instruction.clone())
                    .collect(),
            ),
            step_bead_highlights: Some(tagged),
            total_steps: Some(sequence.steps.len()),
            legacy_label,
        }
    }
}

/// Build an instruction with the default configuration.
pub fn generate_instruction(start: i64, target: i64, legacy_label: Option<&str>) -> Instruction {
    Planner::default().instruction(start, target, legacy_label)
}
