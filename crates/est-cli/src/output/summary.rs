//! Plain-text rendering of reports for the terminal.

use std::fmt::Write;

use est_core::entities::{Report, Task, TaskForest};
use est_db::ReportVersion;

/// Full report: header, task tree with rollups, data model, endpoints, risks,
/// questions and both diagrams.
pub fn report(report: &Report) -> String {
    let draft = &report.draft;
    let mut out = String::new();

    let _ = writeln!(out, "Report {} (v{})", report.id, report.version);
    let _ = writeln!(out, "Requirement: {}", report.requirement_id());
    let _ = writeln!(out, "Created: {}", report.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "Total estimate: {}", report.total_hours());
    if !draft.context_report_ids.is_empty() {
        let _ = writeln!(out, "Context: {}", draft.context_report_ids.join(", "));
    }
    if let Some(summary) = &draft.summary {
        let _ = writeln!(out, "\n{summary}");
    }

    section(&mut out, "Tasks");
    if draft.tasks.is_empty() {
        out.push_str("  (none)\n");
    }
    for root in &draft.tasks.roots {
        if let Some(task) = draft.tasks.get(root) {
            task_tree(&mut out, &draft.tasks, task, 1);
        }
    }

    if !draft.graph.entities.is_empty() {
        section(&mut out, "Entities");
        for entity in &draft.graph.entities {
            let attributes = entity
                .attributes
                .iter()
                .map(|a| format!("{}: {}", a.name, a.data_type))
                .collect::<Vec<_>>();
            if attributes.is_empty() {
                let _ = writeln!(out, "  {}", entity.name);
            } else {
                let _ = writeln!(out, "  {} ({})", entity.name, attributes.join(", "));
            }
        }
        for rel in &draft.graph.relationships {
            let _ = writeln!(
                out,
                "  {} -[{}]-> {} : {}",
                rel.from_entity_id, rel.cardinality, rel.to_entity_id, rel.label
            );
        }
    }

    if !draft.endpoints.is_empty() {
        section(&mut out, "Endpoints");
        for ep in &draft.endpoints {
            let _ = writeln!(
                out,
                "  {:<6} {} ({}) {}",
                ep.method.as_str(),
                ep.path,
                ep.estimate_hours,
                ep.description
            );
        }
        let _ = writeln!(out, "  Endpoint total: {}", report.endpoint_hours());
    }

    if !draft.risks.is_empty() {
        section(&mut out, "Risks");
        for risk in &draft.risks {
            let _ = writeln!(out, "  [{}] {}: {}", risk.severity, risk.kind, risk.description);
        }
    }

    if !draft.suggested_questions.is_empty() {
        section(&mut out, "Questions");
        for question in &draft.suggested_questions {
            let _ = writeln!(out, "  - {question}");
        }
    }

    out.push('\n');
    out.push_str(&diagrams(report));
    out.trim_end().to_string()
}

/// Both diagrams as fenced Mermaid blocks.
pub fn diagrams(report: &Report) -> String {
    format!(
        "```mermaid\n{}```\n\n```mermaid\n{}```",
        report.draft.task_diagram, report.draft.erd_diagram
    )
}

pub fn versions(versions: &[ReportVersion]) -> String {
    if versions.is_empty() {
        return String::from("(no reports)");
    }
    let mut out = String::new();
    for v in versions {
        let _ = writeln!(
            out,
            "v{:<4} {}  {}  {}",
            v.version,
            v.report_id,
            v.created_at.format("%Y-%m-%d %H:%M:%S"),
            v.total_hours
        );
    }
    out.trim_end().to_string()
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{title}:");
}

fn task_tree(out: &mut String, forest: &TaskForest, task: &Task, depth: usize) {
    let indent = "  ".repeat(depth);
    let difficulty = task
        .difficulty
        .map(|d| format!(" [{d}]"))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "{indent}- {} {} ({}){difficulty}",
        task.id, task.title, task.rolled_up_estimate_hours
    );
    for child in forest.children_of(&task.id) {
        task_tree(out, forest, child, depth + 1);
    }
}
