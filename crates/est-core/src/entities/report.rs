use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Endpoint, EntityGraph, RequirementDocument, Risk, TaskForest};
use crate::hours::Hours;

/// Everything one pipeline run produces, before the store assigns identity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReportDraft {
    pub requirement: RequirementDocument,
    pub summary: Option<String>,
    pub tasks: TaskForest,
    pub graph: EntityGraph,
    pub endpoints: Vec<Endpoint>,
    pub risks: Vec<Risk>,
    pub suggested_questions: Vec<String>,
    pub task_diagram: String,
    pub erd_diagram: String,
    /// Prior reports supplied to the oracle as retrieval context.
    pub context_report_ids: Vec<String>,
}

/// A persisted, immutable estimation report.
///
/// Re-analysis never mutates a report; it creates the next `version` for the
/// same requirement ID.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Report {
    pub id: String,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub draft: ReportDraft,
}

impl Report {
    #[must_use]
    pub const fn from_draft(
        id: String,
        version: u32,
        created_at: DateTime<Utc>,
        draft: ReportDraft,
    ) -> Self {
        Self {
            id,
            version,
            created_at,
            draft,
        }
    }

    #[must_use]
    pub fn requirement_id(&self) -> &str {
        &self.draft.requirement.id
    }

    /// Sum of all root rollups in the task forest.
    #[must_use]
    pub fn total_hours(&self) -> Hours {
        self.draft.tasks.total_hours()
    }

    /// Sum of endpoint estimates.
    #[must_use]
    pub fn endpoint_hours(&self) -> Hours {
        self.draft.endpoints.iter().map(|e| e.estimate_hours).sum()
    }
}
