//! Report store configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_db_path() -> String {
    ".est/reports.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Path of the local libSQL database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl StoreConfig {
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.db_path)
    }
}
