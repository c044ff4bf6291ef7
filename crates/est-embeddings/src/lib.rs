//! # est-embeddings
//!
//! Embedding adapter for the estimation engine.
//!
//! [`Embedder`] is the capability the pipeline depends on: text in, a vector
//! of fixed dimension out. Two implementations ship here:
//!
//! - [`EmbeddingEngine`]: local fastembed model ([`AllMiniLML6V2`](fastembed::EmbeddingModel::AllMiniLML6V2),
//!   384 dimensions, mean pooling, no query/passage prefix). Model files are
//!   downloaded on first use into the configured cache directory.
//! - [`DisabledEmbedder`]: always unavailable, so every analysis runs in
//!   degraded mode without retrieval context.
//!
//! The fastembed ONNX runtime is synchronous; [`EmbeddingEngine`] moves
//! inference onto [`tokio::task::spawn_blocking`].

pub mod error;

pub use error::EmbeddingError;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
use parking_lot::Mutex;

/// Text to fixed-length vector.
///
/// Implementations must be deterministic for identical input within one model
/// version.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Output dimensionality.
    fn dimension(&self) -> usize;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Local embedding engine backed by fastembed (ONNX runtime).
///
/// [`TextEmbedding::embed`] requires `&mut self`, so the model sits behind a
/// mutex; clones share one model.
#[derive(Clone)]
pub struct EmbeddingEngine {
    model: Arc<Mutex<TextEmbedding>>,
}

impl EmbeddingEngine {
    /// Create a new embedding engine with the `AllMiniLML6V2` model.
    ///
    /// Downloads the model on first run (~80MB) into `cache_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::InitFailed`] if model download or ONNX initialization fails.
    pub fn new(cache_dir: PathBuf, show_download_progress: bool) -> Result<Self, EmbeddingError> {
        tracing::debug!(cache_dir = %cache_dir.display(), "initializing fastembed model");
        let model = TextEmbedding::try_new(
            TextInitOptions::new(EmbeddingModel::AllMiniLML6V2)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(show_download_progress),
        )
        .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }

    /// Embed a batch of texts. Returns one 384-dim vector per input.
    ///
    /// Blocking; call from `spawn_blocking` in async code.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::EmbedFailed`] if the ONNX inference fails.
    pub fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.model
            .lock()
            .embed(texts, None)
            .map_err(|e| EmbeddingError::EmbedFailed(e.to_string()))
    }

    /// Embed a single text. Returns a 384-dim vector.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::EmbedFailed`] if inference fails, or
    /// [`EmbeddingError::EmptyResult`] if the model returns no embeddings.
    pub fn embed_single(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut results = self.embed_batch(vec![text.to_string()])?;
        results.pop().ok_or(EmbeddingError::EmptyResult)
    }

    /// Embedding vector dimensionality (always 384 for `AllMiniLML6V2`).
    #[must_use]
    pub const fn dimension() -> usize {
        384
    }
}

#[async_trait]
impl Embedder for EmbeddingEngine {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let engine = self.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || engine.embed_single(&text))
            .await
            .map_err(|e| EmbeddingError::EmbedFailed(format!("embedding task failed: {e}")))?
    }

    fn dimension(&self) -> usize {
        Self::dimension()
    }

    fn name(&self) -> &str {
        "fastembed/all-MiniLM-L6-v2"
    }
}

/// An embedder that is never available.
///
/// Used when embedding is disabled in config or the local model could not be
/// initialized.
#[derive(Debug, Clone)]
pub struct DisabledEmbedder {
    reason: String,
}

impl DisabledEmbedder {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Embedder for DisabledEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Unavailable(self.reason.clone()))
    }

    fn dimension(&self) -> usize {
        EmbeddingEngine::dimension()
    }

    fn name(&self) -> &str {
        "disabled"
    }
}
