//! Relation type.

use serde::{Deserialize, Serialize};

use super::validation::{is_valid_relation_type, validate_label};
use crate::error::{MemographError, MemographResult};

/// A typed directed edge between two entities.
///
/// The full `(from, to, relation_type)` triple is the identity of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Name of the source entity.
    pub from: String,
    /// Name of the target entity.
    pub to: String,
    /// Relation type, e.g. `WORKS_FOR`.
    pub relation_type: String,
}

impl Relation {
    /// Create a new relation.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        relation_type: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation_type: relation_type.into(),
        }
    }

    /// Whether this relation has `name` as either endpoint.
    pub fn touches(&self, name: &str) -> bool {
        self.from == name || self.to == name
    }

    /// Check endpoints and the relation type character set.
    pub fn validate(&self) -> MemographResult<()> {
        validate_label(&self.from, "Relation source")?;
        validate_label(&self.to, "Relation target")?;
        if !is_valid_relation_type(&self.relation_type) {
            return Err(MemographError::invalid_relation_type(&self.relation_type));
        }
        Ok(())
    }
}
