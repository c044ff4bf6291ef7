//! # est-oracle
//!
//! Adapter around the external reasoning oracle.
//!
//! - [`Oracle`]: capability trait, one call per `complete`.
//! - [`OracleAdapter`]: per-call timeout, exponential backoff and the
//!   per-run [`CallBudget`] of `max_retries + 1` calls.
//! - [`OraclePrompt`]: requirement text, retrieval context and an optional
//!   repair request.
//! - [`OpenAiOracle`]: OpenAI-compatible chat-completions backend.

pub mod adapter;
pub mod error;
pub mod openai;
pub mod payload;
pub mod prompt;

pub use adapter::{CallBudget, Oracle, OracleAdapter};
pub use error::OracleError;
pub use openai::OpenAiOracle;
pub use payload::RawPayload;
pub use prompt::{ContextEntry, OraclePrompt, RepairRequest};
