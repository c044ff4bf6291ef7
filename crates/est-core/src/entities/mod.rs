//! Entity structs for the estimation report data model.
//!
//! `Task`, `Entity`, `Relationship`, `Endpoint` and `Risk` are owned by exactly
//! one `Report`. All structs derive `Serialize`, `Deserialize`, and `JsonSchema`
//! for JSON roundtrip, persistence and schema export.

mod endpoint;
mod entity;
mod report;
mod requirement;
mod risk;
mod similarity;
mod task;

pub use endpoint::Endpoint;
pub use entity::{Attribute, Entity, EntityGraph, Relationship};
pub use report::{Report, ReportDraft};
pub use requirement::RequirementDocument;
pub use risk::Risk;
pub use similarity::SimilarityRecord;
pub use task::{Task, TaskForest};
