use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Cardinality;

/// A named, typed attribute of an entity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// A data-model entity (e.g. `User`, `Order`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub attributes: Vec<Attribute>,
}

/// A directed relationship between two entities of the same report.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub from_entity_id: String,
    pub to_entity_id: String,
    pub cardinality: Cardinality,
    pub label: String,
}

impl Relationship {
    /// The tuple two relationships must share to be considered duplicates.
    #[must_use]
    pub fn dedup_key(&self) -> (&str, &str, Cardinality, &str) {
        (
            &self.from_entity_id,
            &self.to_entity_id,
            self.cardinality,
            &self.label,
        )
    }
}

/// Entities and the relationships between them, in creation order.
///
/// Unlike the task forest, the graph may be disconnected and cyclic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EntityGraph {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

impl EntityGraph {
    #[must_use]
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }
}
