//! # est-config
//!
//! Layered configuration loading for the estimation engine using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`EST_*` prefix, `__` as separator)
//! 2. Project-level `.est/config.toml`
//! 3. User-level `~/.config/est/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `EST_ORACLE__API_KEY` -> `oracle.api_key`,
//! `EST_RETRIEVAL__TOP_K` -> `retrieval.top_k`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use est_config::EstConfig;
//!
//! let config = EstConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//!
//! if config.oracle.is_configured() {
//!     println!("Oracle model: {}", config.oracle.model);
//! }
//! ```

mod embedding;
mod error;
mod oracle;
mod retrieval;
mod store;
mod validation;

pub use embedding::EmbeddingConfig;
pub use error::ConfigError;
pub use oracle::OracleConfig;
pub use retrieval::RetrievalConfig;
pub use store::StoreConfig;
pub use validation::ValidationConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EstConfig {
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl EstConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests and the CLI can add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".est/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("EST_").split("__"))
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.oracle.timeout_secs == 0 {
            return Err(ConfigError::invalid("oracle.timeout_secs", "must be greater than 0"));
        }
        if self.embedding.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "embedding.timeout_secs",
                "must be greater than 0",
            ));
        }
        if self.retrieval.query_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "retrieval.query_timeout_secs",
                "must be greater than 0",
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::invalid("retrieval.top_k", "must be greater than 0"));
        }
        if self.store.db_path.trim().is_empty() {
            return Err(ConfigError::invalid("store.db_path", "must not be empty"));
        }
        Ok(())
    }

    /// Fail with [`ConfigError::NotConfigured`] when no oracle credentials are present.
    pub fn require_oracle(&self) -> Result<&OracleConfig, ConfigError> {
        if self.oracle.is_configured() {
            Ok(&self.oracle)
        } else {
            Err(ConfigError::NotConfigured {
                section: "oracle".to_string(),
            })
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("est").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) looking for a `.env`
    /// file, then falls back to the current directory. Silently does nothing
    /// if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
