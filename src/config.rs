//! Scheduler configuration.
//!
//! Both knobs trade construction time against result quality:
//!
//! | Field | Used by | Meaning |
//! |-------|---------|---------|
//! | `adjustment_border` | A2.1a | Start-time spread that triggers a mid-construction repair pass |
//! | `combination_border` | Combinatorial refinement | Max suspected tasks per engaged machine resolved by enumeration |

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Time;

/// Eight minutes in milliseconds.
const DEFAULT_ADJUSTMENT_BORDER: Time = 8 * 60 * 1000;

const DEFAULT_COMBINATION_BORDER: f64 = 3.0;

/// Tunable parameters of the construction algorithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Spread between earliest and latest machine start above which the
    /// A2.1a strategy repairs mid-construction (ticks).
    pub adjustment_border: Time,
    /// Enumeration budget of the combinatorial refinement, as a multiple of
    /// the number of engaged machines.
    pub combination_border: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            adjustment_border: DEFAULT_ADJUSTMENT_BORDER,
            combination_border: DEFAULT_COMBINATION_BORDER,
        }
    }
}

impl SchedulerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the adjustment border.
    pub fn with_adjustment_border(mut self, border: Time) -> Self {
        self.adjustment_border = border;
        self
    }

    /// Sets the combination border.
    pub fn with_combination_border(mut self, border: f64) -> Self {
        self.combination_border = border;
        self
    }

    /// Checks that both borders are positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.adjustment_border <= 0 {
            return Err(ConfigError::AdjustmentBorder(self.adjustment_border));
        }
        if !(self.combination_border.is_finite() && self.combination_border > 0.0) {
            return Err(ConfigError::CombinationBorder(self.combination_border));
        }
        Ok(())
    }

    /// Number of suspected tasks that may be enumerated for `engaged`
    /// machines.
    pub fn combination_limit(&self, engaged: usize) -> usize {
        (self.combination_border * engaged as f64).floor() as usize
    }
}
