//! Structured prompt handed to an [`Oracle`](crate::Oracle).
//!
//! The prompt is data; each backend decides how to render it. The default
//! renderings here are what the OpenAI-compatible backend sends.

use std::fmt::Write;

use est_core::entities::Report;
use serde::{Deserialize, Serialize};

/// Task titles shown per prior report.
const CONTEXT_TASK_LIMIT: usize = 8;

/// One prior report used as retrieval context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub report_id: String,
    pub requirement_id: String,
    pub requirement_text: String,
    /// Distance from the new requirement (lower is closer).
    pub distance: f64,
    /// Higher-is-closer score, as computed by the similarity index.
    pub relevance: f64,
    pub total_hours: String,
    pub task_titles: Vec<String>,
}

impl ContextEntry {
    #[must_use]
    pub fn from_report(report: &Report, distance: f64, relevance: f64) -> Self {
        Self {
            report_id: report.id.clone(),
            requirement_id: report.requirement_id().to_string(),
            requirement_text: report.draft.requirement.raw_text.clone(),
            distance,
            relevance,
            total_hours: report.total_hours().to_string(),
            task_titles: report
                .draft
                .tasks
                .tasks
                .iter()
                .take(CONTEXT_TASK_LIMIT)
                .map(|t| t.title.clone())
                .collect(),
        }
    }
}

/// A repair round-trip: the payload that failed and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairRequest {
    pub previous: serde_json::Value,
    pub violations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OraclePrompt {
    pub requirement: String,
    pub context: Vec<ContextEntry>,
    pub repair: Option<RepairRequest>,
}

impl OraclePrompt {
    #[must_use]
    pub fn new(requirement: impl Into<String>, context: Vec<ContextEntry>) -> Self {
        Self {
            requirement: requirement.into(),
            context,
            repair: None,
        }
    }

    /// The same prompt, asking the oracle to fix `previous`.
    #[must_use]
    pub fn with_repair(&self, previous: serde_json::Value, violations: Vec<String>) -> Self {
        Self {
            repair: Some(RepairRequest {
                previous,
                violations,
            }),
            ..self.clone()
        }
    }

    #[must_use]
    pub const fn is_repair(&self) -> bool {
        self.repair.is_some()
    }

    /// Instructions describing the expected JSON object.
    #[must_use]
    pub fn render_system() -> &'static str {
        SYSTEM_PROMPT
    }

    /// Requirement, retrieval context and, for repairs, the violation list.
    #[must_use]
    pub fn render_user(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "## Requirement\n\n{}\n", self.requirement.trim());
        out.push_str(&render_context(&self.context));

        if let Some(repair) = &self.repair {
            out.push_str("\n## Previous Response\n\n```json\n");
            out.push_str(
                &serde_json::to_string_pretty(&repair.previous)
                    .unwrap_or_else(|_| repair.previous.to_string()),
            );
            out.push_str("\n```\n\n## Violations\n\n");
            for violation in &repair.violations {
                let _ = writeln!(out, "- {violation}");
            }
            out.push_str(
                "\nReturn the complete corrected JSON object. Keep every valid record unchanged.\n",
            );
        }
        out
    }
}

/// Markdown block listing prior reports by relevance.
#[must_use]
pub fn render_context(context: &[ContextEntry]) -> String {
    if context.is_empty() {
        return "### Similar Historical Requirements\n\nNo similar historical requirements found.\n"
            .to_string();
    }
    let mut out = String::from("### Similar Historical Requirements\n\n");
    for (i, entry) in context.iter().enumerate() {
        let _ = writeln!(
            out,
            "**Requirement {}** (Report: {}, Relevance: {:.2}, Estimated: {})",
            i + 1,
            entry.report_id,
            entry.relevance,
            entry.total_hours
        );
        let _ = writeln!(out, "{}", entry.requirement_text.trim());
        if !entry.task_titles.is_empty() {
            let _ = writeln!(out, "Tasks: {}", entry.task_titles.join("; "));
        }
        out.push('\n');
    }
    out
}

const SYSTEM_PROMPT: &str = r#"You are a software analyst. Break the requirement into a task hierarchy with hour estimates, a data model, API endpoints and risks.

Respond with a single JSON object and nothing else:
{
  "summary": "one paragraph",
  "tasks": [{"id": "1", "parent_id": null, "title": "...", "description": "...", "difficulty": "easy|medium|hard", "estimate_hours": 4}],
  "entities": [{"id": "user", "name": "User", "attributes": [{"name": "email", "type": "string"}]}],
  "relationships": [{"id": "rel-1", "from_entity_id": "user", "to_entity_id": "session", "cardinality": "one_to_one|one_to_many|many_to_many", "label": "owns"}],
  "endpoints": [{"method": "GET|POST|PUT|DELETE|PATCH", "path": "/api/...", "description": "...", "estimate_hours": 2}],
  "risks": [{"description": "...", "severity": "low|medium|high"}],
  "suggested_questions": ["..."]
}

Rules:
- Task ids are unique. parent_id references another task id or is null for a root.
- Put estimate_hours on leaf tasks only, as a non-negative number of hours.
- Relationships reference entity ids from the same response.
- Use the similar historical requirements, when given, to keep estimates consistent."#;
