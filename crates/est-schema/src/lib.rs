//! # est-schema
//!
//! Contract checks for oracle payloads.
//!
//! - [`SchemaRegistry`]: JSON Schemas for the payload envelope and the
//!   report draft, generated with `schemars`.
//! - [`PayloadValidator`]: lenient record-level validation; bad records
//!   become [`Violation`]s instead of failing the payload.
//! - [`Repairer`]: at most one repair request, then drops what is still
//!   invalid as `RecordDropped` risks.

pub mod coerce;
pub mod envelope;
pub mod error;
pub mod registry;
pub mod repair;
pub mod validator;

pub use error::SchemaError;
pub use registry::SchemaRegistry;
pub use repair::{RepairOutcome, RepairPolicy, Repairer};
pub use validator::{
    PayloadValidator, RecordKind, TaskStub, ValidatedPayload, Validation, Violation,
};
