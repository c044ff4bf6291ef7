//! Payload validation and repair policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const fn default_repair_enabled() -> bool {
    true
}

/// Records still in violation after repair above which the payload counts as unparsable.
const fn default_max_record_violations() -> usize {
    50
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Whether to send one repair request when structural violations remain.
    #[serde(default = "default_repair_enabled")]
    pub repair_enabled: bool,

    /// Delay before the repair request.
    #[serde(default)]
    pub repair_backoff_ms: u64,

    #[serde(default = "default_max_record_violations")]
    pub max_record_violations: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            repair_enabled: default_repair_enabled(),
            repair_backoff_ms: 0,
            max_record_violations: default_max_record_violations(),
        }
    }
}

impl ValidationConfig {
    pub const fn repair_backoff(&self) -> Duration {
        Duration::from_millis(self.repair_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ValidationConfig::default();
        assert!(config.repair_enabled);
        assert_eq!(config.repair_backoff(), Duration::ZERO);
        assert_eq!(config.max_record_violations, 50);
    }
}
