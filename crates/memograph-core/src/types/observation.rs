//! Observation request and result types.

use serde::{Deserialize, Serialize};

/// Observations to add to one entity.
///
/// Also the shape of each `add_observations` result entry, where `contents`
/// holds only what was newly stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationInput {
    /// Name of the owning entity.
    pub entity_name: String,
    /// Observation contents.
    pub contents: Vec<String>,
}

impl ObservationInput {
    pub fn new<I, S>(entity_name: impl Into<String>, contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_name: entity_name.into(),
            contents: contents.into_iter().map(Into::into).collect(),
        }
    }
}

/// Observations to remove from one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationDeletion {
    /// Name of the owning entity.
    pub entity_name: String,
    /// Observation contents to delete.
    pub contents: Vec<String>,
}

impl ObservationDeletion {
    pub fn new<I, S>(entity_name: impl Into<String>, contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_name: entity_name.into(),
            contents: contents.into_iter().map(Into::into).collect(),
        }
    }
}
