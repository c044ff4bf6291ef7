//! Per-run pipeline state tracking.

use est_core::enums::PipelineState;
use est_core::errors::CoreError;

use crate::error::{AnalysisError, FailureReason};

/// Tracks one run through the pipeline states.
#[derive(Debug)]
pub struct StateTracker {
    requirement_id: String,
    current: PipelineState,
}

impl StateTracker {
    #[must_use]
    pub fn new(requirement_id: impl Into<String>) -> Self {
        Self {
            requirement_id: requirement_id.into(),
            current: PipelineState::Ingested,
        }
    }

    #[must_use]
    pub const fn current(&self) -> PipelineState {
        self.current
    }

    /// Move to `next`.
    ///
    /// # Errors
    ///
    /// A `Contract` failure if the transition is not allowed.
    pub fn advance(&mut self, next: PipelineState) -> Result<(), AnalysisError> {
        if !self.current.can_transition_to(next) {
            return Err(self.fail(CoreError::invalid_transition(
                "analysis",
                &self.requirement_id,
                self.current,
                next,
            )));
        }
        tracing::debug!(requirement_id = %self.requirement_id, from = %self.current, to = %next, "pipeline state");
        self.current = next;
        Ok(())
    }

    /// End the run. The error records the furthest state reached.
    #[must_use]
    pub fn fail(&self, reason: impl Into<FailureReason>) -> AnalysisError {
        let reason = reason.into();
        tracing::warn!(
            requirement_id = %self.requirement_id,
            furthest = %self.current,
            reason = reason.kind(),
            error = %reason,
            "analysis failed"
        );
        AnalysisError {
            furthest: self.current,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_path_is_legal() {
        let mut state = StateTracker::new("req-1");
        state.advance(PipelineState::Retrieved).unwrap();
        state.advance(PipelineState::OracleCalled).unwrap();
        assert_eq!(state.current(), PipelineState::OracleCalled);
    }

    #[test]
    fn skipping_a_state_is_a_contract_failure() {
        let mut state = StateTracker::new("req-1");
        state.advance(PipelineState::Embedded).unwrap();
        let err = state.advance(PipelineState::Validated).unwrap_err();
        assert_eq!(err.furthest, PipelineState::Embedded);
        assert!(matches!(
            err.reason,
            FailureReason::Contract(CoreError::InvalidTransition { ref from, ref to, .. })
                if from == "embedded" && to == "validated"
        ));
    }

    #[test]
    fn failure_reports_furthest_state() {
        let mut state = StateTracker::new("req-1");
        state.advance(PipelineState::Retrieved).unwrap();
        let err = state.fail(CoreError::Validation("boom".into()));
        assert_eq!(err.furthest, PipelineState::Retrieved);
        assert_eq!(
            err.to_string(),
            "analysis failed after retrieved: contract violation: Validation error: boom"
        );
    }
}
