use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One entry of the similarity index: the embedding of a requirement and the
/// report produced for it.
///
/// Created when a report is persisted, never mutated, removed only by purge.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SimilarityRecord {
    pub requirement_id: String,
    pub embedding: Vec<f32>,
    pub report_id: String,
}
