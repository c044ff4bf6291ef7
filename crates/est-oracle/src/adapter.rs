//! Call budget, per-call timeout and retry around an [`Oracle`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::OracleError;
use crate::payload::RawPayload;
use crate::prompt::OraclePrompt;

/// External reasoning capability.
///
/// One `complete` call is one billable request. Implementations do not retry;
/// [`OracleAdapter`] owns retries and the per-run budget.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, prompt: &OraclePrompt) -> Result<RawPayload, OracleError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Number of oracle calls left in one pipeline run.
///
/// Shared by the initial completion, its retries and any repair request, so
/// a run never makes more than `max_retries + 1` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallBudget {
    limit: u32,
    used: u32,
}

impl CallBudget {
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self { limit, used: 0 }
    }

    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.limit - self.used
    }

    #[must_use]
    pub const fn used(&self) -> u32 {
        self.used
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }

    fn take(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.used += 1;
        true
    }
}

/// Wraps an [`Oracle`] with timeout, exponential backoff and the call budget.
#[derive(Clone)]
pub struct OracleAdapter {
    oracle: Arc<dyn Oracle>,
    timeout: Duration,
    backoff: Duration,
    max_retries: u32,
}

impl OracleAdapter {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        timeout: Duration,
        backoff: Duration,
        max_retries: u32,
    ) -> Self {
        Self {
            oracle,
            timeout,
            backoff,
            max_retries,
        }
    }

    /// A fresh budget of `max_retries + 1` calls.
    #[must_use]
    pub const fn budget(&self) -> CallBudget {
        CallBudget::new(self.max_retries.saturating_add(1))
    }

    /// Name of the wrapped backend, for logs.
    #[must_use]
    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    /// Make exactly one call, if the budget allows.
    ///
    /// # Errors
    ///
    /// [`OracleError::BudgetExhausted`] when no calls remain, otherwise the
    /// call's own failure (a timeout becomes [`OracleError::Timeout`]).
    pub async fn complete_once(
        &self,
        prompt: &OraclePrompt,
        budget: &mut CallBudget,
    ) -> Result<RawPayload, OracleError> {
        if !budget.take() {
            return Err(OracleError::BudgetExhausted(budget.used()));
        }
        tokio::time::timeout(self.timeout, self.oracle.complete(prompt))
            .await
            .unwrap_or(Err(OracleError::Timeout(self.timeout)))
    }

    /// Call until a payload passes `accept` or the budget runs out.
    ///
    /// Every failure kind is retried while calls remain; a payload `accept`
    /// refuses counts as [`OracleError::Malformed`]. Between attempts the
    /// adapter sleeps `backoff * 2^(attempt - 1)`.
    ///
    /// # Errors
    ///
    /// The last failure once the budget is spent, or
    /// [`OracleError::BudgetExhausted`] if it was empty on entry.
    pub async fn complete_checked<F>(
        &self,
        prompt: &OraclePrompt,
        budget: &mut CallBudget,
        accept: F,
    ) -> Result<RawPayload, OracleError>
    where
        F: Fn(&RawPayload) -> Result<(), String> + Send + Sync,
    {
        let mut last_error = None;
        let mut attempt: u32 = 0;

        while !budget.is_exhausted() {
            if attempt > 0 && !self.backoff.is_zero() {
                let delay = self.backoff.saturating_mul(2u32.saturating_pow(attempt - 1));
                tokio::time::sleep(delay).await;
            }
            attempt += 1;

            let result = self
                .complete_once(prompt, budget)
                .await
                .and_then(|payload| {
                    accept(&payload).map_err(OracleError::Malformed)?;
                    Ok(payload)
                });

            match result {
                Ok(payload) => {
                    tracing::debug!(
                        oracle = self.oracle.name(),
                        attempt,
                        repair = prompt.is_repair(),
                        "oracle call succeeded"
                    );
                    return Ok(payload);
                }
                Err(e) => {
                    tracing::warn!(
                        oracle = self.oracle.name(),
                        attempt,
                        remaining = budget.remaining(),
                        kind = e.kind(),
                        error = %e,
                        "oracle call failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(OracleError::BudgetExhausted(budget.used())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Replays a fixed sequence of results, then fails as unavailable.
    struct Scripted {
        script: Mutex<Vec<Result<RawPayload, OracleError>>>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(mut script: Vec<Result<RawPayload, OracleError>>) -> Arc<Self> {
            script.reverse();
            Arc::new(Self {
                script: Mutex::new(script),
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl Oracle for Scripted {
        async fn complete(&self, _prompt: &OraclePrompt) -> Result<RawPayload, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(OracleError::Unavailable("script exhausted".into())))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    /// Never answers.
    struct Hanging;

    #[async_trait]
    impl Oracle for Hanging {
        async fn complete(&self, _prompt: &OraclePrompt) -> Result<RawPayload, OracleError> {
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "hanging"
        }
    }

    fn adapter(oracle: Arc<dyn Oracle>, max_retries: u32) -> OracleAdapter {
        OracleAdapter::new(
            oracle,
            Duration::from_millis(50),
            Duration::ZERO,
            max_retries,
        )
    }

    fn accept_objects(payload: &RawPayload) -> Result<(), String> {
        if payload.as_value().is_object() {
            Ok(())
        } else {
            Err("not an object".into())
        }
    }

    fn prompt() -> OraclePrompt {
        OraclePrompt::new("Implement login", vec![])
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let oracle = Scripted::new(vec![
            Err(OracleError::Unavailable("503".into())),
            Err(OracleError::Rejected("400".into())),
            Ok(RawPayload::new(serde_json::json!({"tasks": []}))),
        ]);
        let adapter = adapter(oracle.clone(), 2);
        let mut budget = adapter.budget();

        let payload = adapter
            .complete_checked(&prompt(), &mut budget, accept_objects)
            .await
            .unwrap();
        assert!(payload.as_value().is_object());
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 3);
        assert!(budget.is_exhausted());
    }

    #[tokio::test]
    async fn never_exceeds_max_retries_plus_one() {
        let oracle = Scripted::new(vec![]);
        let adapter = adapter(oracle.clone(), 3);
        let mut budget = adapter.budget();

        let err = adapter
            .complete_checked(&prompt(), &mut budget, accept_objects)
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::Unavailable(_)));
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 4);

        let again = adapter.complete_once(&prompt(), &mut budget).await;
        assert!(matches!(again, Err(OracleError::BudgetExhausted(4))));
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn unacceptable_payload_is_malformed_and_retried() {
        let oracle = Scripted::new(vec![
            Ok(RawPayload::new(serde_json::json!("just text"))),
            Ok(RawPayload::new(serde_json::json!({"tasks": []}))),
        ]);
        let adapter = adapter(oracle.clone(), 0);
        let mut budget = adapter.budget();

        let err = adapter
            .complete_checked(&prompt(), &mut budget, accept_objects)
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::Malformed(_)));
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn hanging_oracle_times_out() {
        let adapter = adapter(Arc::new(Hanging), 1);
        let mut budget = adapter.budget();

        let err = adapter
            .complete_checked(&prompt(), &mut budget, accept_objects)
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::Timeout(_)));
        assert_eq!(budget.used(), 2);
    }

    #[test]
    fn budget_arithmetic() {
        let mut budget = CallBudget::new(2);
        assert_eq!(budget.remaining(), 2);
        assert!(budget.take());
        assert!(budget.take());
        assert!(!budget.take());
        assert_eq!(budget.used(), 2);
    }
}
