//! Entity type.

use serde::{Deserialize, Serialize};

use super::validation::{dedup_preserving_order, validate_label};
use crate::error::MemographResult;

/// A named, typed node in the knowledge graph.
///
/// `name` is the global identity of the entity. Name and type are fixed at
/// creation; only the observation set changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Unique entity name.
    pub name: String,
    /// Free-form category.
    pub entity_type: String,
    /// Facts attached to the entity.
    #[serde(default)]
    pub observations: Vec<String>,
}

impl Entity {
    /// Create a new entity without observations.
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            observations: Vec::new(),
        }
    }

    /// Add an observation.
    pub fn with_observation(mut self, observation: impl Into<String>) -> Self {
        self.observations.push(observation.into());
        self
    }

    /// Replace the observations.
    pub fn with_observations<I, S>(mut self, observations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.observations = observations.into_iter().map(Into::into).collect();
        self
    }

    /// Check name and type.
    pub fn validate(&self) -> MemographResult<()> {
        validate_label(&self.name, "Entity name")?;
        validate_label(&self.entity_type, "Entity type")
    }

    /// Copy of this entity with repeated observation contents collapsed.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.clone(),
            entity_type: self.entity_type.clone(),
            observations: dedup_preserving_order(&self.observations),
        }
    }
}
