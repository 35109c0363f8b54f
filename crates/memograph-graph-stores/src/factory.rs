//! Factory for creating graph store providers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use memograph_core::error::{MemographError, MemographResult};
use memograph_core::traits::{GraphStore, GraphStoreConfig, GraphStoreConnector, GraphStoreProvider};

/// Factory for creating graph store providers.
pub struct GraphStoreFactory;

impl GraphStoreFactory {
    /// Create a graph store from the given configuration.
    pub async fn create(config: GraphStoreConfig) -> MemographResult<Arc<dyn GraphStore>> {
        debug!(provider = ?config.provider, "Creating graph store");
        match config.provider {
            #[cfg(feature = "neo4j")]
            GraphStoreProvider::Neo4j => {
                let store = crate::neo4j::Neo4jGraphStore::new(config).await?;
                Ok(Arc::new(store))
            }

            #[cfg(feature = "embedded")]
            GraphStoreProvider::Embedded => {
                let store = crate::embedded::EmbeddedGraphStore::from_config(&config).await?;
                Ok(Arc::new(store))
            }

            #[allow(unreachable_patterns)]
            provider => Err(MemographError::UnsupportedProvider {
                provider: format!("{:?}", provider),
            }),
        }
    }

    /// Create a Neo4j graph store.
    #[cfg(feature = "neo4j")]
    pub async fn neo4j(
        uri: &str,
        username: &str,
        password: &str,
    ) -> MemographResult<Arc<dyn GraphStore>> {
        let config = GraphStoreConfig {
            provider: GraphStoreProvider::Neo4j,
            url: uri.to_string(),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            ..Default::default()
        };
        Self::create(config).await
    }

    /// Create an embedded graph store at `path` (`:memory:` for an in-memory store).
    #[cfg(feature = "embedded")]
    pub async fn embedded(path: &str) -> MemographResult<Arc<dyn GraphStore>> {
        Self::create(GraphStoreConfig::embedded(path)).await
    }
}

/// Connects a fresh store from configuration each time the manager initializes.
#[derive(Debug, Clone)]
pub struct ConfiguredConnector {
    config: GraphStoreConfig,
}

impl ConfiguredConnector {
    pub fn new(config: GraphStoreConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl GraphStoreConnector for ConfiguredConnector {
    async fn connect(&self) -> MemographResult<Arc<dyn GraphStore>> {
        GraphStoreFactory::create(self.config.clone()).await
    }
}

#[cfg(all(test, feature = "embedded"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_embedded_in_memory() {
        let store = GraphStoreFactory::embedded(":memory:").await.unwrap();
        store.ensure_schema().await.unwrap();
        assert!(store.all_entities().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connector_opens_new_store_each_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.db");
        let connector =
            ConfiguredConnector::new(GraphStoreConfig::embedded(path.to_string_lossy()));

        let first = connector.connect().await.unwrap();
        assert!(first.all_entities().await.unwrap().is_empty());
        first.close().await.unwrap();

        let second = connector.connect().await.unwrap();
        assert!(second.all_entities().await.unwrap().is_empty());
        assert!(path.exists());
    }

    #[cfg(not(feature = "neo4j"))]
    #[tokio::test]
    async fn test_disabled_provider_is_unsupported() {
        let result = GraphStoreFactory::create(GraphStoreConfig::default()).await;
        assert!(matches!(
            result,
            Err(MemographError::UnsupportedProvider { .. })
        ));
    }
}
