use std::sync::Arc;

use anyhow::Context;
use est_config::EstConfig;
use est_db::ReportStore;
use est_embeddings::{DisabledEmbedder, Embedder, EmbeddingEngine};
use est_engine::{EngineConfig, EstimationEngine};
use est_oracle::OpenAiOracle;
use est_search::SimilarityIndex;

/// Load `.env`, the config files and `EST_*` overrides, then validate.
pub fn load_config() -> anyhow::Result<EstConfig> {
    let config = EstConfig::load_with_dotenv().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Open the report store and fill its similarity index from disk.
pub async fn open_store(config: &EstConfig) -> anyhow::Result<Arc<ReportStore>> {
    let index = Arc::new(SimilarityIndex::new(config.retrieval.metric));
    let store = ReportStore::open(&config.store, index)
        .await
        .with_context(|| format!("failed to open report store at {}", config.store.db_path))?;
    Ok(Arc::new(store))
}

/// Build the estimation engine. Requires oracle credentials; embedding falls
/// back to degraded mode when the model cannot be loaded.
pub async fn build_engine(
    config: &EstConfig,
    store: Arc<ReportStore>,
) -> anyhow::Result<EstimationEngine> {
    let oracle_config = config.require_oracle().context(
        "no oracle API key configured; set EST_ORACLE__API_KEY or oracle.api_key in .est/config.toml",
    )?;
    let oracle = OpenAiOracle::new(oracle_config).context("failed to create oracle client")?;
    let embedder = build_embedder(config).await;

    Ok(EstimationEngine::new(
        EngineConfig::from_config(config),
        embedder,
        Arc::new(oracle),
        store,
    ))
}

async fn build_embedder(config: &EstConfig) -> Arc<dyn Embedder> {
    if !config.embedding.enabled {
        tracing::info!("embedding disabled by configuration; analyses run without retrieval context");
        return Arc::new(DisabledEmbedder::new("disabled by configuration"));
    }

    let cache_dir = config.embedding.resolved_cache_dir();
    let show_progress = config.embedding.show_download_progress;
    let loaded =
        tokio::task::spawn_blocking(move || EmbeddingEngine::new(cache_dir, show_progress)).await;

    match loaded {
        Ok(Ok(engine)) => Arc::new(engine),
        Ok(Err(error)) => {
            tracing::warn!(%error, "embedding model unavailable; analyses run without retrieval context");
            Arc::new(DisabledEmbedder::new(error.to_string()))
        }
        Err(error) => {
            tracing::warn!(%error, "embedding model initialization panicked");
            Arc::new(DisabledEmbedder::new(error.to_string()))
        }
    }
}
