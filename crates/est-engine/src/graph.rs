//! Entity graph construction.

use std::collections::HashSet;

use est_core::entities::{Entity, EntityGraph, Relationship, Risk};
use est_core::enums::{Cardinality, RiskKind, Severity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOutcome {
    pub graph: EntityGraph,
    pub risks: Vec<Risk>,
}

/// Build the entity graph, keeping creation order.
///
/// Relationships whose endpoints are not among `entities` are dropped with a
/// `DanglingReference` risk. Repeats of a `(from, to, cardinality, label)`
/// tuple are dropped silently. Cycles and disconnected parts are allowed.
#[must_use]
pub fn build_graph(entities: Vec<Entity>, relationships: Vec<Relationship>) -> GraphOutcome {
    let known: HashSet<&str> = entities.iter().map(|e| e.id.as_str()).collect();
    let mut seen: HashSet<(String, String, Cardinality, String)> = HashSet::new();
    let mut risks = Vec::new();
    let mut kept = Vec::with_capacity(relationships.len());

    for rel in relationships {
        let missing: Vec<&str> = [rel.from_entity_id.as_str(), rel.to_entity_id.as_str()]
            .into_iter()
            .filter(|id| !known.contains(id))
            .collect();
        if let Some(first) = missing.first() {
            tracing::warn!(relationship = %rel.id, entity = first, "dropping relationship to unknown entity");
            risks.push(Risk::new(
                RiskKind::DanglingReference,
                Severity::Medium,
                format!(
                    "Relationship '{}' ({} -> {}) references unknown entity '{first}' and was dropped",
                    rel.id, rel.from_entity_id, rel.to_entity_id
                ),
            ));
            continue;
        }

        let (from, to, cardinality, label) = rel.dedup_key();
        let key = (from.to_string(), to.to_string(), cardinality, label.to_string());
        if !seen.insert(key) {
            tracing::debug!(relationship = %rel.id, "dropping duplicate relationship");
            continue;
        }
        kept.push(rel);
    }

    GraphOutcome {
        graph: EntityGraph {
            entities,
            relationships: kept,
        },
        risks,
    }
}
