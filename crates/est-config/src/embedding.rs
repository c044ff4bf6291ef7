//! Local embedding model configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const fn default_enabled() -> bool {
    true
}

const fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// When false the pipeline always runs without retrieval context.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Model cache directory. Empty means `~/.est/cache/fastembed`.
    #[serde(default)]
    pub cache_dir: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub show_download_progress: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            cache_dir: String::new(),
            timeout_secs: default_timeout_secs(),
            show_download_progress: false,
        }
    }
}

impl EmbeddingConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve the cache directory, falling back to `~/.est/cache/fastembed`.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        if !self.cache_dir.is_empty() {
            return PathBuf::from(&self.cache_dir);
        }
        dirs::home_dir().map_or_else(
            || PathBuf::from(".fastembed_cache"),
            |h| h.join(".est").join("cache").join("fastembed"),
        )
    }
}
