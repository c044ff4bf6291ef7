//! Embedding error types.

/// Errors that can occur during embedding generation.
///
/// Every variant means the same thing to the pipeline: no vector is
/// available, so it proceeds without retrieval context.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// Model initialization failed (download, ONNX runtime, cache issues).
    #[error("Model initialization failed: {0}")]
    InitFailed(String),

    /// Embedding generation failed (inference error, invalid input).
    #[error("Embedding generation failed: {0}")]
    EmbedFailed(String),

    /// Model returned zero embeddings for a non-empty input.
    #[error("Empty result from embedding model")]
    EmptyResult,

    /// The caller's deadline elapsed before a vector was produced.
    #[error("Embedding timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// No embedding backend is available (disabled by config or failed to load).
    #[error("Embedding unavailable: {0}")]
    Unavailable(String),
}
