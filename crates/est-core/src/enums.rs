//! Enums for the report data model and the analysis pipeline.
//!
//! All enums use `snake_case` serialization except [`HttpMethod`], which keeps
//! the upper-case verbs. [`PipelineState`] provides `allowed_next_states()` to
//! enforce valid transitions in the orchestrator.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// How a requirement document was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Text,
    Markdown,
}

impl SourceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Oracle-assessed difficulty of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Case-insensitive parse.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "low" => Some(Self::Easy),
            "medium" | "moderate" => Some(Self::Medium),
            "hard" | "high" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Cardinality
// ---------------------------------------------------------------------------

/// Cardinality tag of an entity relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl Cardinality {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneToOne => "one_to_one",
            Self::OneToMany => "one_to_many",
            Self::ManyToMany => "many_to_many",
        }
    }

    /// Parse the spellings oracles commonly produce: `one-to-many`,
    /// `one_to_many`, `OneToMany`, `1:N`, `1-n`, `N:M`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '*'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "onetoone" | "1:1" | "11" => Some(Self::OneToOne),
            "onetomany" | "1:n" | "1n" | "1:m" | "1m" | "1:*" => Some(Self::OneToMany),
            "manytomany" | "n:m" | "nm" | "m:n" | "mn" | "n:n" | "*:*" => Some(Self::ManyToMany),
            _ => None,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// HttpMethod
// ---------------------------------------------------------------------------

/// HTTP verb of an API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    /// Case-insensitive parse.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of a risk note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Case-insensitive parse.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "minor" => Some(Self::Low),
            "medium" | "moderate" => Some(Self::Medium),
            "high" | "critical" | "major" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RiskKind
// ---------------------------------------------------------------------------

/// Where a risk note came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    /// Reported by the oracle as a domain risk.
    Reported,
    /// A field was malformed and coerced (e.g. a negative estimate).
    MalformedField,
    /// A record was dropped after validation and repair failed.
    RecordDropped,
    /// A task cycle was detached into a new root.
    CycleDetected,
    /// A relationship referenced an unknown entity and was dropped.
    DanglingReference,
}

impl RiskKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reported => "reported",
            Self::MalformedField => "malformed_field",
            Self::RecordDropped => "record_dropped",
            Self::CycleDetected => "cycle_detected",
            Self::DanglingReference => "dangling_reference",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "reported" => Some(Self::Reported),
            "malformed_field" => Some(Self::MalformedField),
            "record_dropped" => Some(Self::RecordDropped),
            "cycle_detected" => Some(Self::CycleDetected),
            "dangling_reference" => Some(Self::DanglingReference),
            _ => None,
        }
    }
}

impl fmt::Display for RiskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DistanceMetric
// ---------------------------------------------------------------------------

/// Distance function used by the similarity index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// `1 - cosine_similarity`, in `[0, 2]`.
    #[default]
    Cosine,
    /// Euclidean distance.
    L2,
}

impl DistanceMetric {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::L2 => "l2",
        }
    }

    /// Higher-is-closer score for a distance under this metric: cosine
    /// similarity for `Cosine`, `1 / (1 + d)` in `(0, 1]` for `L2`.
    #[must_use]
    pub fn relevance(self, distance: f64) -> f64 {
        match self {
            Self::Cosine => 1.0 - distance,
            Self::L2 => 1.0 / (1.0 + distance.max(0.0)),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PipelineState
// ---------------------------------------------------------------------------

/// State of a single analysis request.
///
/// ```text
/// ingested → embedded → retrieved → oracle_called → validated
///          ↘ retrieved (degraded)
/// validated → hierarchy_built → graph_built → serialized → persisted
/// any non-terminal state → failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Ingested,
    Embedded,
    Retrieved,
    OracleCalled,
    Validated,
    HierarchyBuilt,
    GraphBuilt,
    Serialized,
    Persisted,
    Failed,
}

impl PipelineState {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Ingested => &[Self::Embedded, Self::Retrieved, Self::Failed],
            Self::Embedded => &[Self::Retrieved, Self::Failed],
            Self::Retrieved => &[Self::OracleCalled, Self::Failed],
            Self::OracleCalled => &[Self::Validated, Self::Failed],
            Self::Validated => &[Self::HierarchyBuilt, Self::Failed],
            Self::HierarchyBuilt => &[Self::GraphBuilt, Self::Failed],
            Self::GraphBuilt => &[Self::Serialized, Self::Failed],
            Self::Serialized => &[Self::Persisted, Self::Failed],
            Self::Persisted | Self::Failed => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Persisted | Self::Failed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ingested => "ingested",
            Self::Embedded => "embedded",
            Self::Retrieved => "retrieved",
            Self::OracleCalled => "oracle_called",
            Self::Validated => "validated",
            Self::HierarchyBuilt => "hierarchy_built",
            Self::GraphBuilt => "graph_built",
            Self::Serialized => "serialized",
            Self::Persisted => "persisted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
