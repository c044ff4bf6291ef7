//! Similarity index error types.

/// Errors from similarity index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The vector length differs from the index's established dimension.
    #[error("dimension mismatch: index holds {expected}-dim vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Vector contains NaN or infinite components.
    #[error("vector has non-finite component at position {0}")]
    NonFinite(usize),

    /// Zero-length vector.
    #[error("empty vector")]
    Empty,
}
