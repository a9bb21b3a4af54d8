//! Clock configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a simulation clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Real milliseconds that make up one virtual time unit.
    pub millis_per_unit: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            millis_per_unit: 1000.0,
        }
    }
}

impl ClockConfig {
    /// Set the number of real milliseconds per virtual time unit.
    pub fn with_millis_per_unit(mut self, millis: f64) -> Self {
        self.millis_per_unit = millis;
        self
    }
}
