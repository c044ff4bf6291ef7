//! Analysis failure types.

use est_core::enums::PipelineState;
use est_core::errors::CoreError;
use est_db::error::DatabaseError;
use est_oracle::OracleError;
use thiserror::Error;

/// Why a pipeline run ended in `Failed`.
#[derive(Debug, Error)]
pub enum FailureReason {
    /// The oracle gave no usable payload within the call budget.
    #[error("oracle failure: {0}")]
    Oracle(#[from] OracleError),

    /// The report could not be committed; nothing was written.
    #[error("persistence failure: {0}")]
    Persistence(#[from] DatabaseError),

    /// An internal contract was broken: an illegal state transition or an
    /// assembled report that does not match the report schema.
    #[error("contract violation: {0}")]
    Contract(#[from] CoreError),
}

impl FailureReason {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Oracle(_) => "oracle_failure",
            Self::Persistence(_) => "persistence_failure",
            Self::Contract(_) => "contract_violation",
        }
    }
}

/// A failed analysis: the reason and the furthest state it reached.
#[derive(Debug, Error)]
#[error("analysis failed after {furthest}: {reason}")]
pub struct AnalysisError {
    pub furthest: PipelineState,
    pub reason: FailureReason,
}

/// Errors from `reanalyze` before a pipeline starts.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot load requirement: {0}")]
    Lookup(#[from] DatabaseError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}
