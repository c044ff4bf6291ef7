use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::SourceKind;
use crate::ids::requirement_id;

/// A software requirement as supplied by the ingestion collaborator.
///
/// Immutable once ingested. The ID is derived from the text, so every
/// re-analysis of the same text lands on the same requirement.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RequirementDocument {
    pub id: String,
    pub raw_text: String,
    pub source_kind: SourceKind,
    pub created_at: DateTime<Utc>,
}

impl RequirementDocument {
    #[must_use]
    pub fn new(raw_text: impl Into<String>, source_kind: SourceKind) -> Self {
        let raw_text = raw_text.into();
        Self {
            id: requirement_id(&raw_text),
            raw_text,
            source_kind,
            created_at: Utc::now(),
        }
    }
}
