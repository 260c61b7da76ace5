//! Abacus configuration.

use serde::{Deserialize, Serialize};

use crate::error::SorobanError;

/// Column count used when callers do not configure one.
pub const DEFAULT_COLUMNS: usize = 5;

/// Largest supported column count.
///
/// A full 18-column abacus plus one carry beyond the top column still fits in
/// an `i64`.
pub const MAX_COLUMNS: usize = 18;

/// Abacus configuration.
///
/// These settings shape the physical model only; they never change the
/// arithmetic of a decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AbacusConfig {
    /// Number of rods (place values) on the abacus.
    pub columns: usize,
    /// Extra recursion levels allowed beyond the digit count.
    pub depth_slack: usize,
}

impl AbacusConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), SorobanError> {
        if self.columns == 0 {
            return Err(SorobanError::InvalidConfig(
                "columns must be > 0".to_string(),
            ));
        }
        if self.columns > MAX_COLUMNS {
            return Err(SorobanError::InvalidConfig(format!(
                "columns must be <= {MAX_COLUMNS} (got {})",
                self.columns
            )));
        }
        Ok(())
    }

    /// Largest value the configured columns can show.
    pub fn max_value(&self) -> i64 {
        let columns = self.columns.min(MAX_COLUMNS) as u32;
        10i64.saturating_pow(columns) - 1
    }

    /// Recursion cap for a decomposition touching `digits` places.
    pub fn depth_limit(&self, digits: u32) -> usize {
        digits as usize + self.depth_slack
    }
}

impl Default for AbacusConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            depth_slack: 2,
        }
    }
}
