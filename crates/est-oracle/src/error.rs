//! Oracle error types.

use std::time::Duration;

/// Failures of a single oracle call, or of the whole call budget.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OracleError {
    /// The call did not complete within the configured timeout.
    #[error("oracle timed out after {0:?}")]
    Timeout(Duration),

    /// The oracle refused the request (content policy, bad request, auth).
    #[error("oracle rejected the request: {0}")]
    Rejected(String),

    /// Transport failure, rate limiting or server error.
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// The response could not be read as a structured payload.
    #[error("oracle returned a malformed payload: {0}")]
    Malformed(String),

    /// No calls left in this run's budget.
    #[error("oracle call budget exhausted after {0} calls")]
    BudgetExhausted(u32),
}

impl OracleError {
    /// Short label for logs and failure reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Rejected(_) => "rejected",
            Self::Unavailable(_) => "unavailable",
            Self::Malformed(_) => "malformed",
            Self::BudgetExhausted(_) => "budget_exhausted",
        }
    }
}
