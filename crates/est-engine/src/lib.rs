//! # est-engine
//!
//! The estimation pipeline.
//!
//! [`EstimationEngine::analyze`] drives one requirement through
//! `Ingested -> Embedded -> Retrieved -> OracleCalled -> Validated ->
//! HierarchyBuilt -> GraphBuilt -> Serialized -> Persisted`:
//!
//! 1. Embed the text and fetch the nearest prior reports as context
//!    (skipped, with a warning, when embedding is unavailable).
//! 2. Ask the oracle for a structured decomposition, within a per-run call
//!    budget.
//! 3. Validate the payload, repairing or dropping invalid records
//!    ([`est_schema::Repairer`]).
//! 4. Build the task forest ([`hierarchy`]) and entity graph ([`graph`]),
//!    turning structural defects into risks.
//! 5. Render Mermaid diagrams ([`diagram`]) and save an immutable, versioned
//!    report ([`est_db::ReportStore`]).

pub mod diagram;
pub mod engine;
pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod state;

pub use engine::{EngineConfig, EstimationEngine};
pub use error::{AnalysisError, EngineError, FailureReason};
