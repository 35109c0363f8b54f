//! MCP tool input type definitions.
//!
//! These types are used with `schemars::JsonSchema` to generate the JSON Schema
//! that MCP clients use to understand tool parameters. Field names are the
//! camelCase names clients send on the wire.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

use memograph_core::{Entity, ObservationDeletion, ObservationInput, Relation};

/// An entity to create.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityParam {
    /// The name of the entity
    pub name: String,
    /// The type of the entity
    pub entity_type: String,
    /// An array of observation contents associated with the entity
    #[serde(default)]
    pub observations: Vec<String>,
}

impl From<EntityParam> for Entity {
    fn from(param: EntityParam) -> Self {
        Entity::new(param.name, param.entity_type).with_observations(param.observations)
    }
}

/// A directed relation between two entities.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationParam {
    /// The name of the entity where the relation starts
    pub from: String,
    /// The name of the entity where the relation ends
    pub to: String,
    /// The type of the relation
    pub relation_type: String,
}

impl From<RelationParam> for Relation {
    fn from(param: RelationParam) -> Self {
        Relation::new(param.from, param.to, param.relation_type)
    }
}

/// Observations to attach to one entity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObservationParam {
    /// The name of the entity to add the observations to
    pub entity_name: String,
    /// An array of observation contents to add
    pub contents: Vec<String>,
}

impl From<ObservationParam> for ObservationInput {
    fn from(param: ObservationParam) -> Self {
        ObservationInput::new(param.entity_name, param.contents)
    }
}

/// Observations to remove from one entity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObservationDeletionParam {
    /// The name of the entity containing the observations
    pub entity_name: String,
    /// An array of observations to delete
    pub contents: Vec<String>,
}

impl From<ObservationDeletionParam> for ObservationDeletion {
    fn from(param: ObservationDeletionParam) -> Self {
        ObservationDeletion::new(param.entity_name, param.contents)
    }
}

/// Input for create_entities tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateEntitiesInput {
    pub entities: Vec<EntityParam>,
}

/// Input for create_relations tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateRelationsInput {
    pub relations: Vec<RelationParam>,
}

/// Input for add_observations tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddObservationsInput {
    pub observations: Vec<ObservationParam>,
}

/// Input for delete_entities tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEntitiesInput {
    /// An array of entity names to delete
    pub entity_names: Vec<String>,
}

/// Input for delete_observations tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteObservationsInput {
    pub deletions: Vec<ObservationDeletionParam>,
}

/// Input for delete_relations tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteRelationsInput {
    /// An array of relations to delete
    pub relations: Vec<RelationParam>,
}

/// Input for search_nodes tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchNodesInput {
    /// The search query to match against entity names, types, and observation content
    pub query: String,
}

/// Input for open_nodes tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct OpenNodesInput {
    /// An array of entity names to retrieve
    pub names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_entities_input_from_wire() {
        let input: CreateEntitiesInput = serde_json::from_value(json!({
            "entities": [
                {"name": "John", "entityType": "Person", "observations": ["likes coding"]},
                {"name": "Acme", "entityType": "Company"}
            ]
        }))
        .unwrap();

        let entities: Vec<Entity> = input.entities.into_iter().map(Into::into).collect();
        assert_eq!(entities[0].entity_type, "Person");
        assert_eq!(entities[0].observations, vec!["likes coding"]);
        assert!(entities[1].observations.is_empty());
    }

    #[test]
    fn test_delete_entities_input_uses_entity_names() {
        let input: DeleteEntitiesInput =
            serde_json::from_value(json!({"entityNames": ["John", "Acme"]})).unwrap();
        assert_eq!(input.entity_names, vec!["John", "Acme"]);

        assert!(serde_json::from_value::<DeleteEntitiesInput>(json!({"names": ["John"]})).is_err());
    }

    #[test]
    fn test_relation_param_conversion() {
        let input: CreateRelationsInput = serde_json::from_value(json!({
            "relations": [{"from": "John", "to": "Acme", "relationType": "WORKS_FOR"}]
        }))
        .unwrap();
        let relation: Relation = input.relations[0].clone().into();
        assert_eq!(relation, Relation::new("John", "Acme", "WORKS_FOR"));
    }

    #[test]
    fn test_observation_params() {
        let add: AddObservationsInput = serde_json::from_value(json!({
            "observations": [{"entityName": "John", "contents": ["a", "b"]}]
        }))
        .unwrap();
        let input: ObservationInput = add.observations[0].clone().into();
        assert_eq!(input, ObservationInput::new("John", ["a", "b"]));

        let delete: DeleteObservationsInput = serde_json::from_value(json!({
            "deletions": [{"entityName": "John", "contents": ["a"]}]
        }))
        .unwrap();
        let deletion: ObservationDeletion = delete.deletions[0].clone().into();
        assert_eq!(deletion, ObservationDeletion::new("John", ["a"]));
    }

    #[test]
    fn test_schema_uses_wire_names() {
        let schema = serde_json::to_value(schemars::schema_for!(DeleteEntitiesInput)).unwrap();
        assert!(schema["properties"]["entityNames"].is_object());
    }
}
