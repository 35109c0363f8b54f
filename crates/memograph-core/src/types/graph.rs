//! Query result shape.

use serde::{Deserialize, Serialize};

use super::{Entity, Relation};

/// A queried snapshot of entities plus the relations touching them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
}

impl KnowledgeGraph {
    /// An empty graph.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(entities: Vec<Entity>, relations: Vec<Relation>) -> Self {
        Self { entities, relations }
    }

    /// Whether the graph has no entities and no relations.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relations.is_empty()
    }

    /// Names of the contained entities, in order.
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.name.as_str()).collect()
    }
}
