//! MCP server exposing the knowledge graph manager.
//!
//! Uses the rmcp SDK's macro-based approach for defining tools.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Serialize;

use memograph_core::{KnowledgeGraphManager, MemographError};

use crate::tools::*;

/// Caller input problems become `invalid_params`; everything else is internal.
fn to_mcp_error(err: MemographError) -> McpError {
    if err.is_validation() {
        McpError::invalid_params(err.to_string(), None)
    } else {
        McpError::internal_error(err.to_string(), None)
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn text_result(text: &str) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// MCP server for knowledge graph operations.
#[derive(Clone)]
pub struct KnowledgeGraphServer {
    manager: Arc<KnowledgeGraphManager>,
    tool_router: ToolRouter<KnowledgeGraphServer>,
}

#[tool_router]
impl KnowledgeGraphServer {
    pub fn new(manager: Arc<KnowledgeGraphManager>) -> Self {
        Self {
            manager,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "create_entities",
        description = "Create multiple new entities in the knowledge graph"
    )]
    async fn create_entities(
        &self,
        Parameters(input): Parameters<CreateEntitiesInput>,
    ) -> Result<CallToolResult, McpError> {
        let entities = input.entities.into_iter().map(Into::into).collect();
        let created = self
            .manager
            .create_entities(entities)
            .await
            .map_err(to_mcp_error)?;
        json_result(&created)
    }

    #[tool(
        name = "create_relations",
        description = "Create multiple new relations between entities in the knowledge graph. Relations should be in active voice"
    )]
    async fn create_relations(
        &self,
        Parameters(input): Parameters<CreateRelationsInput>,
    ) -> Result<CallToolResult, McpError> {
        let relations = input.relations.into_iter().map(Into::into).collect();
        let created = self
            .manager
            .create_relations(relations)
            .await
            .map_err(to_mcp_error)?;
        json_result(&created)
    }

    #[tool(
        name = "add_observations",
        description = "Add new observations to existing entities in the knowledge graph"
    )]
    async fn add_observations(
        &self,
        Parameters(input): Parameters<AddObservationsInput>,
    ) -> Result<CallToolResult, McpError> {
        let observations = input.observations.into_iter().map(Into::into).collect();
        let added = self
            .manager
            .add_observations(observations)
            .await
            .map_err(to_mcp_error)?;
        json_result(&added)
    }

    #[tool(
        name = "delete_entities",
        description = "Delete multiple entities and their associated relations from the knowledge graph"
    )]
    async fn delete_entities(
        &self,
        Parameters(input): Parameters<DeleteEntitiesInput>,
    ) -> Result<CallToolResult, McpError> {
        self.manager
            .delete_entities(input.entity_names)
            .await
            .map_err(to_mcp_error)?;
        text_result("Entities deleted successfully")
    }

    #[tool(
        name = "delete_observations",
        description = "Delete specific observations from entities in the knowledge graph"
    )]
    async fn delete_observations(
        &self,
        Parameters(input): Parameters<DeleteObservationsInput>,
    ) -> Result<CallToolResult, McpError> {
        let deletions = input.deletions.into_iter().map(Into::into).collect();
        self.manager
            .delete_observations(deletions)
            .await
            .map_err(to_mcp_error)?;
        text_result("Observations deleted successfully")
    }

    #[tool(
        name = "delete_relations",
        description = "Delete multiple relations from the knowledge graph"
    )]
    async fn delete_relations(
        &self,
        Parameters(input): Parameters<DeleteRelationsInput>,
    ) -> Result<CallToolResult, McpError> {
        let relations = input.relations.into_iter().map(Into::into).collect();
        self.manager
            .delete_relations(relations)
            .await
            .map_err(to_mcp_error)?;
        text_result("Relations deleted successfully")
    }

    #[tool(
        name = "search_nodes",
        description = "Search for nodes in the knowledge graph based on a query"
    )]
    async fn search_nodes(
        &self,
        Parameters(input): Parameters<SearchNodesInput>,
    ) -> Result<CallToolResult, McpError> {
        let graph = self
            .manager
            .search_nodes(&input.query)
            .await
            .map_err(to_mcp_error)?;
        json_result(&graph)
    }

    #[tool(
        name = "open_nodes",
        description = "Open specific nodes in the knowledge graph by their names"
    )]
    async fn open_nodes(
        &self,
        Parameters(input): Parameters<OpenNodesInput>,
    ) -> Result<CallToolResult, McpError> {
        let graph = self
            .manager
            .open_nodes(input.names)
            .await
            .map_err(to_mcp_error)?;
        json_result(&graph)
    }
}

#[tool_handler]
impl ServerHandler for KnowledgeGraphServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Knowledge graph memory server. Store entities with observations, \
                 connect them with typed relations, then use search_nodes for exact \
                 and fuzzy lookup or open_nodes to fetch entities by name."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memograph_core::{GraphStore, GraphStoreConnector, ManagerConfig};
    use memograph_graph_stores::EmbeddedGraphStore;

    fn server() -> KnowledgeGraphServer {
        let store: Arc<dyn GraphStore> = Arc::new(EmbeddedGraphStore::in_memory().unwrap());
        let connector: Arc<dyn GraphStoreConnector> = Arc::new(store);
        let manager = KnowledgeGraphManager::new(connector, ManagerConfig::default());
        KnowledgeGraphServer::new(Arc::new(manager))
    }

    fn text_of(result: &CallToolResult) -> String {
        serde_json::to_value(result).unwrap()["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_error_mapping() {
        let err = to_mcp_error(MemographError::invalid_relation_type("bad type"));
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

        let err = to_mcp_error(MemographError::connection("refused"));
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    }

    #[tokio::test]
    async fn test_create_then_search_over_tools() {
        let server = server();

        let input: CreateEntitiesInput = serde_json::from_value(serde_json::json!({
            "entities": [{"name": "John", "entityType": "Person", "observations": ["likes coding"]}]
        }))
        .unwrap();
        let result = server.create_entities(Parameters(input)).await.unwrap();
        let created: serde_json::Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(created[0]["entityType"], "Person");

        let result = server
            .search_nodes(Parameters(SearchNodesInput {
                query: "john".to_string(),
            }))
            .await
            .unwrap();
        let graph: serde_json::Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(graph["entities"][0]["name"], "John");
        assert!(graph["relations"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_returns_confirmation_text() {
        let server = server();

        let result = server
            .delete_entities(Parameters(DeleteEntitiesInput {
                entity_names: vec!["Ghost".to_string()],
            }))
            .await
            .unwrap();
        assert_eq!(text_of(&result), "Entities deleted successfully");
    }

    #[tokio::test]
    async fn test_invalid_relation_type_is_invalid_params() {
        let server = server();

        let err = server
            .create_relations(Parameters(CreateRelationsInput {
                relations: vec![RelationParam {
                    from: "a".to_string(),
                    to: "b".to_string(),
                    relation_type: "not valid".to_string(),
                }],
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }
}
