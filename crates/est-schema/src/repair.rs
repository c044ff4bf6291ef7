//! Bounded repair of payloads with record-level violations.
//!
//! At most one repair request is sent per run, and only while the shared call
//! budget has calls left. Whatever is still in violation afterwards is dropped
//! and surfaced as a `RecordDropped` risk.

use std::time::Duration;

use est_config::ValidationConfig;
use est_oracle::{CallBudget, OracleAdapter, OracleError, OraclePrompt, RawPayload};

use crate::validator::{PayloadValidator, Validation, ValidatedPayload, Violation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairPolicy {
    pub enabled: bool,
    pub backoff: Duration,
    /// Violations left after repair above which the payload is unusable.
    pub max_violations: usize,
}

impl RepairPolicy {
    #[must_use]
    pub const fn from_config(config: &ValidationConfig) -> Self {
        Self {
            enabled: config.repair_enabled,
            backoff: config.repair_backoff(),
            max_violations: config.max_record_violations,
        }
    }
}

impl Default for RepairPolicy {
    fn default() -> Self {
        Self::from_config(&ValidationConfig::default())
    }
}

/// Result of validation plus optional repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairOutcome {
    /// Clean records, with one `RecordDropped` risk per dropped record.
    pub payload: ValidatedPayload,
    pub dropped: Vec<Violation>,
    /// Whether the repaired payload replaced the original.
    pub repaired: bool,
}

pub struct Repairer {
    validator: PayloadValidator,
    policy: RepairPolicy,
}

impl Repairer {
    #[must_use]
    pub fn new(policy: RepairPolicy) -> Self {
        Self {
            validator: PayloadValidator::new(),
            policy,
        }
    }

    #[must_use]
    pub const fn validator(&self) -> &PayloadValidator {
        &self.validator
    }

    #[must_use]
    pub const fn policy(&self) -> RepairPolicy {
        self.policy
    }

    /// Validate `raw`, send at most one repair request for its violations,
    /// and finalize.
    ///
    /// A failed or worse repair keeps the original validation. The repair
    /// draws from `budget`, the same budget as the initial call.
    ///
    /// # Errors
    ///
    /// [`OracleError::Malformed`] when `raw` fails the envelope, or when more
    /// than `max_violations` records remain in violation.
    pub async fn validate_and_repair(
        &self,
        adapter: &OracleAdapter,
        prompt: &OraclePrompt,
        budget: &mut CallBudget,
        raw: RawPayload,
    ) -> Result<RepairOutcome, OracleError> {
        let mut validation = self
            .validator
            .validate(&raw)
            .map_err(|e| OracleError::Malformed(e.to_string()))?;
        let mut repaired = false;

        if !validation.is_clean() && self.policy.enabled {
            if budget.is_exhausted() {
                tracing::warn!(
                    violations = validation.violations.len(),
                    "call budget spent; skipping repair"
                );
            } else if let Some(better) = self.repair(adapter, prompt, budget, raw, &validation).await {
                validation = better;
                repaired = true;
            }
        }

        self.finalize(validation, repaired)
    }

    async fn repair(
        &self,
        adapter: &OracleAdapter,
        prompt: &OraclePrompt,
        budget: &mut CallBudget,
        raw: RawPayload,
        original: &Validation,
    ) -> Option<Validation> {
        if !self.policy.backoff.is_zero() {
            tokio::time::sleep(self.policy.backoff).await;
        }
        let repair_prompt = prompt.with_repair(raw.into_value(), original.violation_messages());

        let candidate = match adapter.complete_once(&repair_prompt, budget).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "repair request failed; keeping original payload");
                return None;
            }
        };

        match self.validator.validate(&candidate) {
            Ok(v) if v.violations.len() <= original.violations.len() => {
                tracing::info!(
                    before = original.violations.len(),
                    after = v.violations.len(),
                    "repaired payload accepted"
                );
                Some(v)
            }
            Ok(v) => {
                tracing::warn!(
                    before = original.violations.len(),
                    after = v.violations.len(),
                    "repair increased violations; keeping original payload"
                );
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "repaired payload is unparsable; keeping original payload");
                None
            }
        }
    }

    fn finalize(&self, validation: Validation, repaired: bool) -> Result<RepairOutcome, OracleError> {
        let Validation {
            mut payload,
            violations,
        } = validation;

        if violations.len() > self.policy.max_violations {
            return Err(OracleError::Malformed(format!(
                "{} records failed validation (limit {})",
                violations.len(),
                self.policy.max_violations
            )));
        }

        for violation in &violations {
            tracing::warn!(%violation, "dropping record");
        }
        payload.risks.extend(violations.iter().map(Violation::to_risk));

        Ok(RepairOutcome {
            payload,
            dropped: violations,
            repaired,
        })
    }
}

impl Default for Repairer {
    fn default() -> Self {
        Self::new(RepairPolicy::default())
    }
}
