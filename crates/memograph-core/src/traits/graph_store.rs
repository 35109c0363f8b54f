//! Graph store traits and related types.
//!
//! A [`GraphStore`] is the durable, authoritative home of entities,
//! observations and relations. Mutations run inside a [`GraphTransaction`]
//! so that each read-then-write dedup sequence is atomic per call.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MemographResult;
use crate::types::{Entity, Relation};

/// Core GraphStore trait - all graph store backends implement this.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create the name uniqueness constraint, the type index and the
    /// full-text index if they do not exist yet. Safe to call on every start.
    async fn ensure_schema(&self) -> MemographResult<()>;

    /// Open a unit of work. The caller must finish it with
    /// [`GraphTransaction::commit`] or [`GraphTransaction::rollback`].
    async fn begin(&self) -> MemographResult<Box<dyn GraphTransaction>>;

    /// Every entity with its observations.
    async fn all_entities(&self) -> MemographResult<Vec<Entity>>;

    /// Names of entities whose name or type token-matches `query`, best match first.
    async fn fulltext_search(&self, query: &str) -> MemographResult<Vec<String>>;

    /// Entities (with observations) whose name is in `names`.
    async fn entities_by_name(&self, names: &[String]) -> MemographResult<Vec<Entity>>;

    /// Relations with at least one endpoint in `names`.
    async fn relations_touching(&self, names: &[String]) -> MemographResult<Vec<Relation>>;

    /// Release the underlying connection.
    async fn close(&self) -> MemographResult<()>;
}

/// A unit of work against a [`GraphStore`].
///
/// Writes become visible to other sessions only after `commit`.
#[async_trait]
pub trait GraphTransaction: Send {
    /// Names of all existing entities.
    async fn entity_names(&mut self) -> MemographResult<HashSet<String>>;

    /// Whether an entity with `name` exists.
    async fn entity_exists(&mut self, name: &str) -> MemographResult<bool>;

    /// Persist an entity and its observations as child records.
    async fn insert_entity(&mut self, entity: &Entity) -> MemographResult<()>;

    /// Delete entities, their observations and every incident relation.
    /// Unknown names are ignored.
    async fn delete_entities(&mut self, names: &[String]) -> MemographResult<()>;

    /// All existing `(from, to, relation_type)` triples.
    async fn relation_triples(&mut self) -> MemographResult<HashSet<Relation>>;

    /// Persist a relation whose endpoints are known to exist.
    async fn insert_relation(&mut self, relation: &Relation) -> MemographResult<()>;

    /// Delete the edge matching the triple, if any.
    async fn delete_relation(&mut self, relation: &Relation) -> MemographResult<()>;

    /// Current observation contents of one entity.
    async fn observation_contents(&mut self, entity_name: &str)
        -> MemographResult<HashSet<String>>;

    /// Attach new observation records to an existing entity.
    async fn insert_observations(
        &mut self,
        entity_name: &str,
        contents: &[String],
    ) -> MemographResult<()>;

    /// Delete observation records of one entity whose content is in `contents`.
    async fn delete_observations(
        &mut self,
        entity_name: &str,
        contents: &[String],
    ) -> MemographResult<()>;

    /// Make all writes durable and release the session.
    async fn commit(self: Box<Self>) -> MemographResult<()>;

    /// Discard all writes and release the session.
    async fn rollback(self: Box<Self>) -> MemographResult<()>;
}

/// Opens graph store connections for the manager's lazy initialization.
#[async_trait]
pub trait GraphStoreConnector: Send + Sync {
    async fn connect(&self) -> MemographResult<Arc<dyn GraphStore>>;
}

/// Hands out one pre-built store. Reconnecting after `close` yields the same store.
#[async_trait]
impl GraphStoreConnector for Arc<dyn GraphStore> {
    async fn connect(&self) -> MemographResult<Arc<dyn GraphStore>> {
        Ok(Arc::clone(self))
    }
}

/// Graph store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphStoreConfig {
    /// Provider type.
    pub provider: GraphStoreProvider,
    /// Connection URL (Bolt URI for Neo4j, database path for the embedded store).
    pub url: String,
    /// Username for authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password for authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Logical database name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Driver connection pool size.
    pub max_connections: usize,
    /// Connections older than this are replaced on next use.
    pub max_connection_lifetime_secs: u64,
}

/// Three hours, matching the usual Bolt driver default.
pub const DEFAULT_MAX_CONNECTION_LIFETIME_SECS: u64 = 3 * 60 * 60;

impl Default for GraphStoreConfig {
    fn default() -> Self {
        Self {
            provider: GraphStoreProvider::Neo4j,
            url: "bolt://localhost:7687".to_string(),
            username: None,
            password: None,
            database: None,
            max_connections: 16,
            max_connection_lifetime_secs: DEFAULT_MAX_CONNECTION_LIFETIME_SECS,
        }
    }
}

impl GraphStoreConfig {
    /// Configuration for an embedded store at `path` (`:memory:` for a throwaway store).
    pub fn embedded(path: impl Into<String>) -> Self {
        Self {
            provider: GraphStoreProvider::Embedded,
            url: path.into(),
            ..Default::default()
        }
    }
}

/// Graph store provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GraphStoreProvider {
    #[default]
    Neo4j,
    Embedded,
}

impl std::str::FromStr for GraphStoreProvider {
    type Err = crate::error::MemographError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "neo4j" => Ok(Self::Neo4j),
            "embedded" | "sqlite" => Ok(Self::Embedded),
            other => Err(crate::error::MemographError::UnsupportedProvider {
                provider: other.to_string(),
            }),
        }
    }
}
