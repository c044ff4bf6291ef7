//! Outer shape of an oracle payload.
//!
//! The envelope only pins down that the payload is an object and that each
//! record collection, when present, is an array. `summary` and
//! `suggested_questions` are plain fields: a wrong shape there is dropped by
//! the validator. Record-level checks also happen in the validator, where a
//! bad record is dropped rather than failing the whole payload.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Top-level payload keys and the alternative spellings accepted for each.
pub const SUMMARY_KEYS: &[&str] = &["summary"];
pub const TASK_KEYS: &[&str] = &["tasks", "task_breakdown"];
pub const ENTITY_KEYS: &[&str] = &["entities", "erd_analysis"];
pub const RELATIONSHIP_KEYS: &[&str] = &["relationships"];
pub const ENDPOINT_KEYS: &[&str] = &["endpoints", "api_analysis"];
pub const RISK_KEYS: &[&str] = &["risks", "risks_and_considerations"];
pub const QUESTION_KEYS: &[&str] = &["suggested_questions", "questions"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PayloadEnvelope {
    pub summary: Option<serde_json::Value>,
    #[serde(alias = "task_breakdown")]
    pub tasks: Option<Vec<serde_json::Value>>,
    #[serde(alias = "erd_analysis")]
    pub entities: Option<Vec<serde_json::Value>>,
    pub relationships: Option<Vec<serde_json::Value>>,
    #[serde(alias = "api_analysis")]
    pub endpoints: Option<Vec<serde_json::Value>>,
    #[serde(alias = "risks_and_considerations")]
    pub risks: Option<Vec<serde_json::Value>>,
    #[serde(alias = "questions")]
    pub suggested_questions: Option<serde_json::Value>,
}

/// Record collections paired with their aliases, in payload order. Each must
/// be an array when present.
pub const RECORD_COLLECTIONS: &[&[&str]] = &[
    TASK_KEYS,
    ENTITY_KEYS,
    RELATIONSHIP_KEYS,
    ENDPOINT_KEYS,
    RISK_KEYS,
];

/// Every top-level key the validator reads.
pub const KNOWN_KEYS: &[&[&str]] = &[
    SUMMARY_KEYS,
    TASK_KEYS,
    ENTITY_KEYS,
    RELATIONSHIP_KEYS,
    ENDPOINT_KEYS,
    RISK_KEYS,
    QUESTION_KEYS,
];
