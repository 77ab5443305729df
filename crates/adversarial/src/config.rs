//! Driver configuration.
//!
//! ```toml
//! tick_timeout_ms = 1000
//! max_expansions = 500
//! max_algorithm_steps = "unlimited"
//! ```

use std::time::Duration;

use plyboard_core::{PlyError, PlyResult};
use serde::{Deserialize, Serialize};

use crate::budget::Budget;

/// Default wall-clock slice per tick.
pub const DEFAULT_TICK_TIMEOUT_MS: u64 = 1000;

fn default_tick_timeout_ms() -> u64 {
    DEFAULT_TICK_TIMEOUT_MS
}

/// How much work a [`SearchDriver`](crate::SearchDriver) does per tick.
///
/// Use the builder methods to adjust the defaults:
///
/// ```
/// use plyboard_adversarial::{Budget, DriverConfig};
///
/// let config = DriverConfig::new().max_expansions(Budget::Limited(100)).tick_timeout_ms(250);
/// assert_eq!(config.tick_timeout().as_millis(), 250);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Wall-clock limit for each pull loop, in milliseconds.
    #[serde(default = "default_tick_timeout_ms")]
    pub tick_timeout_ms: u64,
    /// Expansions allowed per tick.
    #[serde(default)]
    pub max_expansions: Budget,
    /// Algorithm steps allowed per tick.
    #[serde(default)]
    pub max_algorithm_steps: Budget,
}

impl DriverConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> PlyResult<Self> {
        toml::from_str(text).map_err(|e| PlyError::runtime(format!("invalid driver configuration: {}", e)))
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> PlyResult<String> {
        toml::to_string(self).map_err(|e| PlyError::runtime(format!("cannot write driver configuration: {}", e)))
    }

    /// Set the per-tick wall-clock slice.
    pub fn tick_timeout_ms(mut self, ms: u64) -> Self {
        self.tick_timeout_ms = ms;
        self
    }

    /// Set the expansion budget.
    pub fn max_expansions(mut self, budget: Budget) -> Self {
        self.max_expansions = budget;
        self
    }

    /// Set the algorithm budget.
    pub fn max_algorithm_steps(mut self, budget: Budget) -> Self {
        self.max_algorithm_steps = budget;
        self
    }

    /// Per-tick slice as a duration.
    pub fn tick_timeout(&self) -> Duration {
        Duration::from_millis(self.tick_timeout_ms)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_timeout_ms: DEFAULT_TICK_TIMEOUT_MS,
            max_expansions: Budget::Unlimited,
            max_algorithm_steps: Budget::Unlimited,
        }
    }
}
