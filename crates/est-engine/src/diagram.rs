//! Mermaid rendering of the task forest and the entity graph.
//!
//! Both renderers are pure: nodes and edges are emitted in creation order
//! (ties by id), so an unchanged report always renders byte-for-byte the same.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use est_core::entities::{EntityGraph, TaskForest};
use est_core::enums::Cardinality;

const INDENT: &str = "    ";

/// Make `text` safe inside a quoted Mermaid label.
#[must_use]
pub fn escape_label(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '#' => out.push_str("#35;"),
            '"' => out.push_str("#quot;"),
            '<' => out.push_str("#lt;"),
            '>' => out.push_str("#gt;"),
            '\n' | '\r' | '\t' => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

/// Flowchart node ids: `-` would run into the edge syntax and `end` closes
/// a subgraph.
fn is_flowchart_id(id: &str) -> bool {
    !id.is_empty()
        && !id.eq_ignore_ascii_case("end")
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_er_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Node identifiers usable in markup, unique per diagram.
///
/// Ids passing `is_safe` are kept as they are. Others become
/// `<fallback><position>`, with underscores appended until unique.
fn node_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    fallback: &str,
    is_safe: fn(&str) -> bool,
) -> HashMap<&'a str, String> {
    let ids: Vec<&str> = ids.collect();
    let mut used: HashSet<String> = ids
        .iter()
        .filter(|id| is_safe(id))
        .map(|id| (*id).to_string())
        .collect();

    let mut out = HashMap::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        if is_safe(id) {
            out.insert(*id, (*id).to_string());
            continue;
        }
        let mut candidate = format!("{fallback}{}", i + 1);
        while used.contains(&candidate) {
            candidate.push('_');
        }
        used.insert(candidate.clone());
        out.insert(*id, candidate);
    }
    out
}

/// Creation-order positions, sorted stably by (position, id).
fn emission_order<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<(usize, &'a str)> {
    let mut order: Vec<(usize, &str)> = ids.enumerate().collect();
    order.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    order
}

/// `graph TD` flowchart: one node per task labelled with its rollup, then one
/// edge per parent/child link.
#[must_use]
pub fn render_task_diagram(forest: &TaskForest) -> String {
    let ids = node_ids(forest.tasks.iter().map(|t| t.id.as_str()), "t", is_flowchart_id);
    let order = emission_order(forest.tasks.iter().map(|t| t.id.as_str()));

    let mut out = String::from("graph TD\n");
    for &(pos, _) in &order {
        let task = &forest.tasks[pos];
        let _ = writeln!(
            out,
            "{INDENT}{}[\"{} ({})\"]",
            ids[task.id.as_str()],
            escape_label(&task.title),
            task.rolled_up_estimate_hours
        );
    }
    for &(pos, _) in &order {
        let parent = &forest.tasks[pos];
        for child in forest.children_of(&parent.id) {
            let _ = writeln!(
                out,
                "{INDENT}{}-->{}",
                ids[parent.id.as_str()],
                ids[child.id.as_str()]
            );
        }
    }
    out
}

const fn crow_foot(cardinality: Cardinality) -> &'static str {
    match cardinality {
        Cardinality::OneToOne => "||--||",
        Cardinality::OneToMany => "||--o{",
        Cardinality::ManyToMany => "}o--o{",
    }
}

/// Replace characters Mermaid does not allow in ER identifiers.
fn er_token(text: &str) -> String {
    let token: String = text
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if token.is_empty() { "_".to_string() } else { token }
}

/// `erDiagram`: entities with their attributes, then relationships.
///
/// An entity whose name differs from its node id is drawn with the name as
/// its alias.
#[must_use]
pub fn render_erd(graph: &EntityGraph) -> String {
    let ids = node_ids(graph.entities.iter().map(|e| e.id.as_str()), "e", is_er_id);
    let order = emission_order(graph.entities.iter().map(|e| e.id.as_str()));

    let mut out = String::from("erDiagram\n");
    for &(pos, _) in &order {
        let entity = &graph.entities[pos];
        let node = &ids[entity.id.as_str()];
        let display = entity.name.trim();
        let name = if display.is_empty() || display == node {
            node.clone()
        } else {
            format!("{node}[\"{}\"]", escape_label(display))
        };
        if entity.attributes.is_empty() {
            let _ = writeln!(out, "{INDENT}{name}");
            continue;
        }
        let _ = writeln!(out, "{INDENT}{name} {{");
        for attr in &entity.attributes {
            let _ = writeln!(
                out,
                "{INDENT}{INDENT}{} {}",
                er_token(&attr.data_type),
                er_token(&attr.name)
            );
        }
        let _ = writeln!(out, "{INDENT}}}");
    }

    let rel_order = emission_order(graph.relationships.iter().map(|r| r.id.as_str()));
    for &(pos, _) in &rel_order {
        let rel = &graph.relationships[pos];
        let (Some(from), Some(to)) = (
            ids.get(rel.from_entity_id.as_str()),
            ids.get(rel.to_entity_id.as_str()),
        ) else {
            continue;
        };
        let _ = writeln!(
            out,
            "{INDENT}{from} {} {to} : \"{}\"",
            crow_foot(rel.cardinality),
            escape_label(&rel.label)
        );
    }
    out
}
