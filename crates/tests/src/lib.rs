//! Integration test harness for soroban sequences.
//!
//! Replays a generated sequence bead by bead on a [`BeadGrid`], so every
//! physical rule (no gaps among earth beads, no toggling a bead into the
//! state it is already in, at most four earth beads) is enforced on every
//! intermediate state: Plan → Replay → Verify.

use soroban_core::{to_state, AbacusConfig, BeadGrid, BeadState, Planner, UnifiedSequence};

/// Replays one `(start, target)` sequence on a physical grid.
pub struct AbacusHarness {
    sequence: UnifiedSequence,
    grid: BeadGrid,
    next_step: usize,
    signed_total: i64,
    states: Vec<BeadState>,
}

impl AbacusHarness {
    /// Plan `start -> target` with the default five-column abacus.
    pub fn new(start: i64, target: i64) -> Self {
        Self::with_config(start, target, AbacusConfig::default())
    }

    /// Plan `start -> target` on a configured abacus.
    ///
    /// The grid is wide enough to hold every intermediate value, so sequences
    /// that spill past the configured columns can still be replayed.
    ///
    /// # Panics
    ///
    /// Panics if the config is invalid or the start state cannot be built.
    pub fn with_config(start: i64, target: i64, config: AbacusConfig) -> Self {
        let planner = Planner::new(config).expect("invalid abacus config");
        let sequence = planner.sequence(start, target);
        let width = sequence
            .steps
            .iter()
            .map(|step| step.expected_value)
            .chain([start, target])
            .map(|value| soroban_core::digit_count(value) as usize)
            .max()
            .unwrap_or(1)
            .max(config.columns);
        let initial = to_state(start, width);
        let grid = BeadGrid::from_state(&initial).expect("start state rejected");
        Self {
            sequence,
            grid,
            next_step: 0,
            signed_total: 0,
            states: vec![initial],
        }
    }

    /// Replay the next step, returning how many beads moved.
    ///
    /// # Panics
    ///
    /// Panics if there is no step left or a bead toggle is physically illegal.
    pub fn step(&mut self) -> usize {
        let step = self
            .sequence
            .steps
            .get(self.next_step)
            .expect("no steps left to replay");
        for highlight in &step.bead_movements {
            self.grid.apply(&highlight.change).unwrap_or_else(|e| {
                panic!("step {} rejected by the grid: {e}", step.step_index)
            });
            self.signed_total += highlight.change.signed_value();
            self.states.push(self.grid.to_state());
        }
        self.next_step += 1;
        step.bead_movements.len()
    }

    /// Replay every remaining step.
    pub fn run(&mut self) -> &mut Self {
        while !self.is_finished() {
            self.step();
        }
        self
    }

    pub fn is_finished(&self) -> bool {
        self.next_step >= self.sequence.steps.len()
    }

    /// Current value shown on the grid.
    pub fn value(&self) -> i64 {
        self.grid.value()
    }

    /// Number of rods on the replay grid.
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Signed bead value replayed so far.
    pub fn signed_total(&self) -> i64 {
        self.signed_total
    }

    /// Every state the grid passed through, one per toggle, start first.
    pub fn states(&self) -> &[BeadState] {
        &self.states
    }

    /// The planned sequence.
    pub fn sequence(&self) -> &UnifiedSequence {
        &self.sequence
    }

    /// Expected value of the last replayed step.
    pub fn expected_value(&self) -> i64 {
        match self.next_step.checked_sub(1) {
            Some(index) => self.sequence.steps[index].expected_value,
            None => self.sequence.start_value,
        }
    }
}
