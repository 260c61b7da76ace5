//! Instruction sequence generator.
//!
//! Turns `(start, target)` into an ordered list of steps. Each nonzero digit
//! of the difference is decomposed at its place (highest place first); every
//! resulting move becomes one step with its own running value, equation term
//! and bead movements.
//!
//! # Equation
//!
//! The narrated equation reads
//! `"{start} + {diff} = {start} + {term} + ... = {target}"`. Complement pairs
//! render parenthesized (`"(5 - 1)"`); when a carry was itself decomposed the
//! outer remainder trails plainly (`"99 + (100 - 90) - 9"`). Offsets are
//! recorded while the string is written, never searched for afterwards.
//!
//! # Bead movements
//!
//! A step's movements are the bead diff between its previous and new running
//! value. When the configured rods cannot hold those values the literal diff
//! no longer adds up to the move, and the movements are synthesized over the
//! digits the move actually touches; the step then carries an issue for every
//! rod outside the abacus.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::codec::{digit_at, digit_count, place_unit, to_state};
use crate::complement::{decompose, Complement, PlaceMove, Rule};
use crate::config::{AbacusConfig, MAX_COLUMNS};
use crate::diff::{bead_phrase, diff_from_values, place_name, summarize, BeadChange, Direction};
use crate::error::SorobanError;
use crate::grid::BeadGrid;

/// Half-open byte range `[start_index, end_index)` into the equation string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermPosition {
    pub start_index: usize,
    pub end_index: usize,
}

impl TermPosition {
    /// Slice `text` at this range.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start_index..self.end_index).unwrap_or("")
    }
}

/// A bead change tagged with the step it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepBeadHighlight {
    #[serde(flatten)]
    pub change: BeadChange,
    pub step_index: usize,
}

/// One narrated step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedStep {
    pub step_index: usize,
    /// Signed term value as text (`"5"`, `"-1"`, `"100"`).
    pub mathematical_term: String,
    pub english_instruction: String,
    /// Abacus value after this step.
    pub expected_value: i64,
    pub bead_movements: Vec<StepBeadHighlight>,
    /// Where the term's number sits in the equation.
    pub term_position: TermPosition,
    pub is_valid: bool,
    pub validation_issues: Vec<String>,
}

impl UnifiedStep {
    /// Movements without their step tags.
    pub fn changes(&self) -> Vec<BeadChange> {
        self.bead_movements.iter().map(|h| h.change).collect()
    }
}

/// A rendered piece of the equation: a plain term or a complement pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecompositionTerm {
    /// Exact equation text, e.g. `"10"` or `"(5 - 1)"`.
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
    /// Net signed contribution.
    pub value: i64,
    pub step_indices: Vec<usize>,
    pub bead_changes: Vec<BeadChange>,
}

/// Teaching view of one digit of the difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PedagogicalSegment {
    pub place: u32,
    /// Signed digit of the difference at this place.
    pub digit: i8,
    pub rule: Rule,
    pub start_value: i64,
    pub end_value: i64,
    pub step_indices: Vec<usize>,
    pub term_range: TermPosition,
    /// Equation substring at `term_range`.
    pub expression: String,
    pub title: String,
    pub summary: String,
}

/// Full narrated plan from `start_value` to `target_value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedSequence {
    pub start_value: i64,
    pub target_value: i64,
    pub full_decomposition: String,
    pub steps: Vec<UnifiedStep>,
    pub terms: Vec<DecompositionTerm>,
    pub segments: Vec<PedagogicalSegment>,
}

impl UnifiedSequence {
    /// Signed bead value summed over every step's movements.
    pub fn bead_total(&self) -> i64 {
        self.steps
            .iter()
            .flat_map(|step| &step.bead_movements)
            .fold(0i64, |total, h| total.saturating_add(h.change.signed_value()))
    }

    /// Value after the last step (the start value when there are none).
    pub fn final_value(&self) -> i64 {
        self.steps
            .last()
            .map_or(self.start_value, |step| step.expected_value)
    }

    /// Whether every step certified cleanly.
    pub fn is_valid(&self) -> bool {
        self.steps.iter().all(|step| step.is_valid)
    }
}

/// Decomposition of one digit of the difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDecomposition {
    pub place: u32,
    pub digit: i8,
    pub start_value: i64,
    pub end_value: i64,
    pub complement: Complement,
}

/// Equation piece prior to rendering.
enum Segment {
    Single(PlaceMove),
    Group(PlaceMove, PlaceMove),
}

fn segments(complement: &Complement, out: &mut Vec<Segment>) {
    match complement {
        Complement::Direct(m) => out.push(Segment::Single(*m)),
        Complement::FiveComplement { addition, removal } => {
            out.push(Segment::Group(*addition, *removal));
        }
        Complement::TenComplement { carry, remainder } => match remainder.as_ref() {
            Complement::Direct(rest) => out.push(Segment::Group(*carry, *rest)),
            other => {
                out.push(Segment::Single(*carry));
                segments(other, out);
            }
        },
        Complement::RecursiveComplement { inner, remainder } => {
            segments(inner, out);
            segments(remainder, out);
        }
    }
}

/// Append-only string that reports where each piece landed.
#[derive(Default)]
struct EquationWriter {
    text: String,
}

impl EquationWriter {
    fn push(&mut self, piece: &str) -> TermPosition {
        let start_index = self.text.len();
        self.text.push_str(piece);
        TermPosition {
            start_index,
            end_index: self.text.len(),
        }
    }

    fn connector(&mut self, positive: bool) {
        self.push(if positive { " + " } else { " - " });
    }
}

/// Builds sequences for one abacus configuration.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: AbacusConfig,
}

impl Planner {
    /// Create a planner with a validated config.
    pub fn new(config: AbacusConfig) -> Result<Self, SorobanError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AbacusConfig {
        &self.config
    }

    /// Decompose every nonzero digit of `target - start`, highest place first.
    pub fn plan(&self, start: i64, target: i64) -> Result<Vec<PlaceDecomposition>, SorobanError> {
        if start < 0 || target < 0 {
            return Err(SorobanError::NegativeValue(start.min(target)));
        }
        let ceiling = place_unit(MAX_COLUMNS as u32) - 1;
        if let Some(value) = [start, target].into_iter().find(|v| *v > ceiling) {
            return Err(SorobanError::exceeds(value, MAX_COLUMNS, ceiling));
        }
        let difference = target
            .checked_sub(start)
            .ok_or(SorobanError::Overflow { start, target })?;

        let sign: i8 = if difference < 0 { -1 } else { 1 };
        let magnitude = difference.abs();
        let budget = self.config.depth_limit(digit_count(start.max(target)));

        let mut running = start;
        let mut places = Vec::new();
        if difference != 0 {
            for place in (0..digit_count(magnitude)).rev() {
                let digit = digit_at(magnitude, place) as i8;
                if digit == 0 {
                    continue;
                }
                let complement = decompose(running, place, sign * digit, budget);
                let end_value = running + complement.net_value();
                places.push(PlaceDecomposition {
                    place,
                    digit: sign * digit,
                    start_value: running,
                    end_value,
                    complement,
                });
                running = end_value;
            }
        }

        debug!(start, target, places = places.len(), "plan built");
        Ok(places)
    }

    /// Build the full narrated sequence.
    pub fn sequence(&self, start: i64, target: i64) -> UnifiedSequence {
        let places = match self.plan(start, target) {
            Ok(places) => places,
            Err(err) => return self.degraded(start, target, err),
        };

        let mut writer = EquationWriter::default();
        let magnitude = target.abs_diff(start);
        writer.push(&start.to_string());
        writer.connector(target >= start);
        writer.push(&magnitude.to_string());
        writer.push(" = ");
        writer.push(&start.to_string());

        let mut steps: Vec<UnifiedStep> = Vec::new();
        let mut terms = Vec::new();
        let mut pedagogy = Vec::new();
        let mut running = start;

        for decomposition in &places {
            let mut pieces = Vec::new();
            segments(&decomposition.complement, &mut pieces);
            let first_step = steps.len();
            let mut range: Option<TermPosition> = None;

            for piece in pieces {
                let (lead, trail) = match piece {
                    Segment::Single(m) => (m, None),
                    Segment::Group(a, b) => (a, Some(b)),
                };
                writer.connector(lead.is_addition());
                let term_start = writer.text.len();
                let step_from = steps.len();

                if let Some(trail) = trail {
                    writer.push("(");
                    let lead_pos = writer.push(&lead.magnitude().to_string());
                    steps.push(self.step(steps.len(), lead, lead_pos, &mut running));
                    writer.connector(trail.is_addition() == lead.is_addition());
                    let trail_pos = writer.push(&trail.magnitude().to_string());
                    steps.push(self.step(steps.len(), trail, trail_pos, &mut running));
                    writer.push(")");
                } else {
                    let pos = writer.push(&lead.magnitude().to_string());
                    steps.push(self.step(steps.len(), lead, pos, &mut running));
                }

                let span = TermPosition {
                    start_index: term_start,
                    end_index: writer.text.len(),
                };
                range = Some(match range {
                    Some(r) => TermPosition {
                        end_index: span.end_index,
                        ..r
                    },
                    None => span,
                });
                let covered = &steps[step_from..];
                terms.push(DecompositionTerm {
                    text: span.slice(&writer.text).to_string(),
                    start_index: span.start_index,
                    end_index: span.end_index,
                    value: lead.value() + trail.map_or(0, |t| t.value()),
                    step_indices: covered.iter().map(|s| s.step_index).collect(),
                    bead_changes: covered.iter().flat_map(UnifiedStep::changes).collect(),
                });
            }

            let term_range = range.unwrap_or_default();
            let (title, summary) = explain(decomposition);
            pedagogy.push(PedagogicalSegment {
                place: decomposition.place,
                digit: decomposition.digit,
                rule: decomposition.complement.rule(),
                start_value: decomposition.start_value,
                end_value: decomposition.end_value,
                step_indices: (first_step..steps.len()).collect(),
                term_range,
                expression: term_range.slice(&writer.text).to_string(),
                title,
                summary,
            });
        }

        if !places.is_empty() {
            writer.push(" = ");
            writer.push(&target.to_string());
        }

        UnifiedSequence {
            start_value: start,
            target_value: target,
            full_decomposition: writer.text,
            steps,
            terms,
            segments: pedagogy,
        }
    }

    fn step(
        &self,
        step_index: usize,
        m: PlaceMove,
        term_position: TermPosition,
        running: &mut i64,
    ) -> UnifiedStep {
        let previous = *running;
        let next = previous + m.value();
        *running = next;

        let (changes, mut issues) = self.materialize(previous, next, m);
        issues.extend(self.certify(previous, next, &changes));
        trace!(
            step_index,
            term = m.value(),
            previous,
            next,
            beads = changes.len(),
            "step materialized"
        );

        UnifiedStep {
            step_index,
            mathematical_term: m.value().to_string(),
            english_instruction: english(m, &changes),
            expected_value: next,
            bead_movements: changes
                .into_iter()
                .map(|change| StepBeadHighlight { change, step_index })
                .collect(),
            term_position,
            is_valid: issues.is_empty(),
            validation_issues: issues,
        }
    }

    fn materialize(
        &self,
        previous: i64,
        next: i64,
        m: PlaceMove,
    ) -> (Vec<BeadChange>, Vec<String>) {
        let columns = self.config.columns;
        let literal = diff_from_values(previous, next, columns);
        if literal.signed_total() == m.value() {
            return (literal.changes, Vec::new());
        }

        let width = wide_width(previous, next, columns);
        let changes = diff_from_values(previous, next, width).changes;
        let mut outside: Vec<u32> = changes
            .iter()
            .map(|c| c.place_value)
            .filter(|place| *place as usize >= columns)
            .collect();
        outside.sort_unstable();
        outside.dedup();
        let issues = outside
            .into_iter()
            .map(|place| {
                format!(
                    "Bead movement in {} column is outside the {columns}-column abacus",
                    place_name(place)
                )
            })
            .collect();
        (changes, issues)
    }

    /// Replay the movements on a physical grid.
    fn certify(&self, previous: i64, next: i64, changes: &[BeadChange]) -> Vec<String> {
        let width = wide_width(previous, next, self.config.columns);
        let mut grid = match BeadGrid::from_state(&to_state(previous, width)) {
            Ok(grid) => grid,
            Err(err) => return vec![err.to_string()],
        };
        if let Err(err) = grid.apply_all(changes) {
            return vec![err.to_string()];
        }
        let reached = grid.value();
        if reached != next {
            return vec![format!("Bead movements reach {reached} instead of {next}")];
        }
        Vec::new()
    }

    fn degraded(&self, start: i64, target: i64, err: SorobanError) -> UnifiedSequence {
        warn!(start, target, error = %err, "cannot decompose; returning a flagged single step");
        let difference = target.saturating_sub(start);
        let mut writer = EquationWriter::default();
        writer.push(&start.to_string());
        writer.connector(target >= start);
        let term_position = writer.push(&target.abs_diff(start).to_string());
        writer.push(" = ");
        writer.push(&target.to_string());

        let step = UnifiedStep {
            step_index: 0,
            mathematical_term: difference.to_string(),
            english_instruction: format!("Change the value from {start} to {target}"),
            expected_value: target,
            bead_movements: Vec::new(),
            term_position,
            is_valid: false,
            validation_issues: vec![err.to_string()],
        };
        UnifiedSequence {
            start_value: start,
            target_value: target,
            terms: vec![DecompositionTerm {
                text: term_position.slice(&writer.text).to_string(),
                start_index: term_position.start_index,
                end_index: term_position.end_index,
                value: difference,
                step_indices: vec![0],
                bead_changes: Vec::new(),
            }],
            full_decomposition: writer.text,
            steps: vec![step],
            segments: Vec::new(),
        }
    }
}

fn wide_width(previous: i64, next: i64, columns: usize) -> usize {
    (digit_count(previous.max(next)) as usize).max(columns)
}

/// One consolidated line per step: `"Add 3 to ones column (3 earth beads)"`.
fn english(m: PlaceMove, changes: &[BeadChange]) -> String {
    let (verb, preposition, direction) = if m.is_addition() {
        ("Add", "to", Direction::Activate)
    } else {
        ("Remove", "from", Direction::Deactivate)
    };
    let local = !changes.is_empty()
        && changes
            .iter()
            .all(|c| c.place_value == m.place && c.direction == direction);
    let detail = if local {
        bead_phrase(changes)
    } else {
        summarize(changes)
    };
    format!(
        "{verb} {} {preposition} {} column ({detail})",
        m.digit.unsigned_abs(),
        place_name(m.place)
    )
}

/// Title and readable reason for one digit's rule.
fn explain(decomposition: &PlaceDecomposition) -> (String, String) {
    let amount = decomposition.digit.unsigned_abs();
    let adding = decomposition.digit > 0;
    let column = place_name(decomposition.place);
    let next = place_name(decomposition.place + 1);
    let unit = place_unit(decomposition.place);
    let title = format!(
        "{} {amount} in the {column} column",
        if adding { "Add" } else { "Subtract" }
    );

    // Unscaled size of the at-this-place half of a ten or cascade.
    let leftover = |remainder: &Complement| (remainder.net_value() / unit).unsigned_abs();

    let summary = match &decomposition.complement {
        Complement::Direct(_) if adding => {
            format!("The {column} column has room: add {amount} directly.")
        }
        Complement::Direct(_) => {
            format!("The {column} column has the beads: take away {amount} directly.")
        }
        Complement::FiveComplement { addition, removal } if adding => {
            let k = removal.digit.unsigned_abs();
            let mut text = format!(
                "Not enough earth beads in the {column} column: {amount} = 5 - {k}, \
                 so add the heaven bead and take away {k}."
            );
            if digit_at(decomposition.start_value, addition.place) >= 5 {
                text.push_str(&format!(
                    " The heaven bead is already down, so the 5 carries into the {next} column."
                ));
            }
            text
        }
        Complement::FiveComplement { addition, .. } => {
            let k = addition.digit.unsigned_abs();
            format!(
                "Not enough earth beads to take away {amount}: -{amount} = +{k} - 5, \
                 so add {k} earth beads and lift the heaven bead."
            )
        }
        Complement::TenComplement { remainder, .. } if adding => {
            let k = leftover(remainder);
            format!(
                "The {column} column would overflow: {amount} = 10 - {k}, \
                 so carry 1 into the {next} column and take away {k} here."
            )
        }
        Complement::TenComplement { remainder, .. } => {
            let k = leftover(remainder);
            format!(
                "The {column} column is short: -{amount} = -10 + {k}, \
                 so borrow 1 from the {next} column and add {k} here."
            )
        }
        Complement::RecursiveComplement { remainder, .. } => {
            let k = leftover(remainder);
            if adding {
                format!(
                    "Carrying 1 into the {next} column is not direct either, so the carry \
                     ripples into higher columns before taking away {k} here."
                )
            } else {
                format!(
                    "Borrowing 1 from the {next} column is not direct either, so the borrow \
                     ripples into higher columns before adding {k} here."
                )
            }
        }
    };
    (title, summary)
}

/// Build a sequence with the default configuration.
pub fn generate_sequence(start: i64, target: i64) -> UnifiedSequence {
    Planner::default().sequence(start, target)
}
