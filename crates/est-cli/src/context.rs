use std::sync::Arc;

use est_config::EstConfig;
use est_db::ReportStore;
use est_engine::EstimationEngine;

use crate::bootstrap;

/// Everything a command handler needs.
///
/// The engine is built on demand: read-only commands work without oracle
/// credentials or an embedding model.
pub struct AppContext {
    pub config: EstConfig,
    pub store: Arc<ReportStore>,
}

impl AppContext {
    pub async fn init(config: EstConfig) -> anyhow::Result<Self> {
        let store = bootstrap::open_store(&config).await?;
        Ok(Self { config, store })
    }

    pub async fn engine(&self) -> anyhow::Result<EstimationEngine> {
        bootstrap::build_engine(&self.config, Arc::clone(&self.store)).await
    }
}
