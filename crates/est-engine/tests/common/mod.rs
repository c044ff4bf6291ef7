//! Test doubles and fixtures shared by the pipeline tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use est_core::enums::DistanceMetric;
use est_db::ReportStore;
use est_embeddings::{Embedder, EmbeddingError};
use est_engine::{EngineConfig, EstimationEngine};
use est_oracle::{Oracle, OracleError, OraclePrompt, RawPayload};
use est_schema::RepairPolicy;
use est_search::SimilarityIndex;
use serde_json::{Value, json};
use tempfile::TempDir;

const DIMENSION: usize = 16;

/// Bag-of-words embedder: each word bumps one bucket, then the vector is
/// normalized. Texts sharing words land close together.
pub struct HashEmbedder;

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0_f32; DIMENSION];
        for word in text.split_whitespace() {
            let bucket = word
                .to_lowercase()
                .bytes()
                .fold(7_usize, |acc, b| acc.wrapping_mul(31).wrapping_add(usize::from(b)));
            vector[bucket % DIMENSION] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            return Err(EmbeddingError::EmptyResult);
        }
        Ok(vector.into_iter().map(|v| v / norm).collect())
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// Never produces a vector.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Unavailable("model not installed".into()))
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    fn name(&self) -> &str {
        "failing"
    }
}

type Responder = dyn Fn(&OraclePrompt) -> Result<RawPayload, OracleError> + Send + Sync;

/// Answers every prompt through a closure and records what it was asked.
pub struct FakeOracle {
    respond: Box<Responder>,
    prompts: Mutex<Vec<OraclePrompt>>,
}

impl FakeOracle {
    pub fn new(
        respond: impl Fn(&OraclePrompt) -> Result<RawPayload, OracleError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Always returns `payload`.
    pub fn always(payload: Value) -> Arc<Self> {
        Self::new(move |_| Ok(RawPayload::new(payload.clone())))
    }

    /// Always fails with `error`.
    pub fn failing(error: OracleError) -> Arc<Self> {
        Self::new(move |_| Err(error.clone()))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<OraclePrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for FakeOracle {
    async fn complete(&self, prompt: &OraclePrompt) -> Result<RawPayload, OracleError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        (self.respond)(prompt)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        embed_timeout: Duration::from_secs(5),
        query_timeout: Duration::from_secs(5),
        top_k: 3,
        oracle_timeout: Duration::from_secs(5),
        oracle_backoff: Duration::ZERO,
        max_retries: 2,
        repair: RepairPolicy {
            enabled: true,
            backoff: Duration::ZERO,
            max_violations: 50,
        },
    }
}

/// A store in a temporary directory.
pub struct Harness {
    pub dir: TempDir,
    pub store: Arc<ReportStore>,
}

impl Harness {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(SimilarityIndex::new(DistanceMetric::Cosine));
        let store = ReportStore::open_local(&dir.path().join("reports.db"), index)
            .await
            .unwrap();
        Self {
            dir,
            store: Arc::new(store),
        }
    }

    pub fn engine(&self, embedder: Arc<dyn Embedder>, oracle: Arc<dyn Oracle>) -> EstimationEngine {
        EstimationEngine::new(test_config(), embedder, oracle, Arc::clone(&self.store))
    }
}

/// The login decomposition: one root with two estimated leaves.
pub fn login_payload() -> Value {
    json!({
        "summary": "Email and password login",
        "tasks": [
            {"id": "1", "title": "Login"},
            {"id": "2", "parent_id": "1", "title": "Validate credentials", "estimate_hours": 6},
            {"id": "3", "parent_id": "1", "title": "Issue session token", "estimate_hours": 4}
        ],
        "entities": [
            {"id": "user", "name": "User", "attributes": [{"name": "email", "type": "string"}]},
            {"id": "session", "name": "Session", "attributes": ["token: string"]}
        ],
        "relationships": [
            {"from": "user", "to": "session", "cardinality": "one_to_many", "label": "owns"}
        ],
        "endpoints": [
            {"method": "POST", "path": "/api/login", "description": "Sign in", "estimate_hours": 2}
        ],
        "risks": [
            {"description": "Credential stuffing", "severity": "high"}
        ],
        "suggested_questions": ["Is SSO required?"]
    })
}
