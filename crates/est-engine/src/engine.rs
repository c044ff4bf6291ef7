//! The estimation pipeline.

use std::sync::Arc;
use std::time::Duration;

use est_config::EstConfig;
use est_core::entities::{Report, ReportDraft, RequirementDocument};
use est_core::enums::PipelineState;
use est_core::errors::CoreError;
use est_db::ReportStore;
use est_embeddings::{Embedder, EmbeddingError};
use est_oracle::{ContextEntry, Oracle, OracleAdapter, OraclePrompt};
use est_schema::{RepairPolicy, Repairer, SchemaRegistry, ValidatedPayload};

use crate::diagram::{render_erd, render_task_diagram};
use crate::error::{AnalysisError, EngineError};
use crate::graph::build_graph;
use crate::hierarchy::build_forest;
use crate::state::StateTracker;

/// Engine settings, resolved once from [`EstConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub embed_timeout: Duration,
    pub query_timeout: Duration,
    pub top_k: usize,
    pub oracle_timeout: Duration,
    pub oracle_backoff: Duration,
    pub max_retries: u32,
    pub repair: RepairPolicy,
}

impl EngineConfig {
    #[must_use]
    pub const fn from_config(config: &EstConfig) -> Self {
        Self {
            embed_timeout: config.embedding.timeout(),
            query_timeout: config.retrieval.query_timeout(),
            top_k: config.retrieval.top_k,
            oracle_timeout: config.oracle.timeout(),
            oracle_backoff: config.oracle.retry_backoff(),
            max_retries: config.oracle.max_retries,
            repair: RepairPolicy::from_config(&config.validation),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_config(&EstConfig::default())
    }
}

/// Turns requirements into persisted estimation reports.
///
/// One call to [`Self::analyze`] is one pipeline run with its own oracle call
/// budget. Runs share only the report store and its similarity index, so any
/// number may execute concurrently.
pub struct EstimationEngine {
    config: EngineConfig,
    embedder: Arc<dyn Embedder>,
    oracle: OracleAdapter,
    repairer: Repairer,
    schemas: SchemaRegistry,
    store: Arc<ReportStore>,
}

impl EstimationEngine {
    pub fn new(
        config: EngineConfig,
        embedder: Arc<dyn Embedder>,
        oracle: Arc<dyn Oracle>,
        store: Arc<ReportStore>,
    ) -> Self {
        let adapter = OracleAdapter::new(
            oracle,
            config.oracle_timeout,
            config.oracle_backoff,
            config.max_retries,
        );
        Self {
            repairer: Repairer::new(config.repair),
            schemas: SchemaRegistry::new(),
            config,
            embedder,
            oracle: adapter,
            store,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<ReportStore> {
        &self.store
    }

    /// Run the full pipeline for one requirement.
    ///
    /// Embedding and retrieval are best-effort: on failure the run continues
    /// without retrieval context. Nothing is persisted unless every stage
    /// succeeds.
    ///
    /// # Errors
    ///
    /// [`AnalysisError`] with the furthest state reached when the oracle gives
    /// no usable payload, the assembled report breaks the report schema, or
    /// the report cannot be saved.
    pub async fn analyze(&self, requirement: RequirementDocument) -> Result<Report, AnalysisError> {
        let mut state = StateTracker::new(requirement.id.as_str());
        tracing::info!(
            requirement_id = %requirement.id,
            kind = %requirement.source_kind,
            oracle = self.oracle.oracle_name(),
            "analysis started"
        );

        let embedding = self.embed(&requirement).await;
        let context = match &embedding {
            Some(vector) => {
                state.advance(PipelineState::Embedded)?;
                self.retrieve(vector).await
            }
            None => Vec::new(),
        };
        state.advance(PipelineState::Retrieved)?;

        let prompt = OraclePrompt::new(requirement.raw_text.as_str(), context);
        let mut budget = self.oracle.budget();
        let validator = self.repairer.validator();
        let raw = self
            .oracle
            .complete_checked(&prompt, &mut budget, |payload| {
                validator.check_envelope(payload).map_err(|e| e.to_string())
            })
            .await
            .map_err(|e| state.fail(e))?;
        state.advance(PipelineState::OracleCalled)?;

        let outcome = self
            .repairer
            .validate_and_repair(&self.oracle, &prompt, &mut budget, raw)
            .await
            .map_err(|e| state.fail(e))?;
        state.advance(PipelineState::Validated)?;
        tracing::debug!(
            requirement_id = %requirement.id,
            oracle_calls = budget.used(),
            repaired = outcome.repaired,
            dropped = outcome.dropped.len(),
            "payload validated"
        );

        let ValidatedPayload {
            summary,
            tasks,
            entities,
            relationships,
            endpoints,
            mut risks,
            suggested_questions,
        } = outcome.payload;

        let hierarchy = build_forest(&tasks);
        risks.extend(hierarchy.risks);
        state.advance(PipelineState::HierarchyBuilt)?;

        let graph = build_graph(entities, relationships);
        risks.extend(graph.risks);
        state.advance(PipelineState::GraphBuilt)?;

        let task_diagram = render_task_diagram(&hierarchy.forest);
        let erd_diagram = render_erd(&graph.graph);
        state.advance(PipelineState::Serialized)?;

        let draft = ReportDraft {
            context_report_ids: prompt.context.iter().map(|c| c.report_id.clone()).collect(),
            requirement,
            summary,
            tasks: hierarchy.forest,
            graph: graph.graph,
            endpoints,
            risks,
            suggested_questions,
            task_diagram,
            erd_diagram,
        };
        self.schemas
            .check_report_draft(&draft)
            .map_err(|e| state.fail(CoreError::Validation(e.to_string())))?;

        let report = self
            .store
            .save(draft, embedding)
            .await
            .map_err(|e| state.fail(e))?;
        state.advance(PipelineState::Persisted)?;

        tracing::info!(
            requirement_id = %report.requirement_id(),
            report_id = %report.id,
            version = report.version,
            total_hours = %report.total_hours(),
            tasks = report.draft.tasks.len(),
            risks = report.draft.risks.len(),
            "analysis persisted"
        );
        Ok(report)
    }

    /// Analyze the requirement behind the latest report again, producing the
    /// next version.
    ///
    /// # Errors
    ///
    /// [`EngineError::Lookup`] for an unknown requirement, otherwise as
    /// [`Self::analyze`].
    pub async fn reanalyze(&self, requirement_id: &str) -> Result<Report, EngineError> {
        let latest = self.store.latest(requirement_id).await?;
        tracing::info!(requirement_id, previous_version = latest.version, "re-analysis requested");
        Ok(self.analyze(latest.draft.requirement).await?)
    }

    async fn embed(&self, requirement: &RequirementDocument) -> Option<Vec<f32>> {
        let result = tokio::time::timeout(
            self.config.embed_timeout,
            self.embedder.embed(&requirement.raw_text),
        )
        .await
        .unwrap_or(Err(EmbeddingError::Timeout(self.config.embed_timeout)));

        match result {
            Ok(vector) => Some(vector),
            Err(e) => {
                tracing::warn!(
                    requirement_id = %requirement.id,
                    embedder = self.embedder.name(),
                    error = %e,
                    "embedding unavailable; continuing without retrieval context"
                );
                None
            }
        }
    }

    /// Up to `top_k` prior reports nearest to `vector`. Empty on any failure.
    async fn retrieve(&self, vector: &[f32]) -> Vec<ContextEntry> {
        let index = Arc::clone(self.store.index());
        let query = vector.to_vec();
        let k = self.config.top_k;
        let search = tokio::task::spawn_blocking(move || index.query(&query, k));

        let hits = match tokio::time::timeout(self.config.query_timeout, search).await {
            Ok(Ok(Ok(hits))) => hits,
            Ok(Ok(Err(e))) => {
                tracing::warn!(error = %e, "similarity query failed; continuing without context");
                return Vec::new();
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "similarity query panicked; continuing without context");
                return Vec::new();
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.config.query_timeout,
                    "similarity query timed out; continuing without context"
                );
                return Vec::new();
            }
        };

        let mut context = Vec::with_capacity(hits.len());
        for hit in hits {
            match self.store.get(&hit.report_id).await {
                Ok(report) => context.push(ContextEntry::from_report(&report, hit.distance, hit.relevance)),
                Err(e) => {
                    tracing::warn!(report_id = %hit.report_id, error = %e, "skipping unreadable context report");
                }
            }
        }
        tracing::debug!(hits = context.len(), "retrieval context ready");
        context
    }
}
