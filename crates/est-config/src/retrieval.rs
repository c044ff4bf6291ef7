//! Similarity retrieval configuration.

use est_core::enums::DistanceMetric;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of prior reports handed to the oracle.
const fn default_top_k() -> usize {
    5
}

const fn default_query_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub metric: DistanceMetric,

    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            metric: DistanceMetric::default(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

impl RetrievalConfig {
    pub const fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = RetrievalConfig::default();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.metric, DistanceMetric::Cosine);
        assert_eq!(config.query_timeout(), Duration::from_secs(5));
    }
}
