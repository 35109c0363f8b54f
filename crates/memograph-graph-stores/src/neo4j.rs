//! Neo4j graph store implementation.
//!
//! Entities are `:Entity {name, entityType}` nodes. Each observation is its
//! own `:Observation {content}` node linked by `HAS_OBSERVATION`, and
//! relations are native edges whose label is the relation type.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph, Query, Row, Txn};
use tokio::sync::RwLock;
use tracing::{debug, info};

use memograph_core::error::{ErrorCode, MemographError, MemographResult};
use memograph_core::traits::{GraphStore, GraphStoreConfig, GraphTransaction};
use memograph_core::types::{is_valid_relation_type, Entity, Relation};

const CREATE_NAME_CONSTRAINT: &str = r#"
CREATE CONSTRAINT entity_name_unique IF NOT EXISTS
FOR (e:Entity) REQUIRE e.name IS UNIQUE
"#;

const CREATE_TYPE_INDEX: &str = r#"
CREATE INDEX entity_type_index IF NOT EXISTS
FOR (e:Entity) ON (e.entityType)
"#;

const CREATE_FULLTEXT_INDEX: &str = r#"
CREATE FULLTEXT INDEX entity_fulltext IF NOT EXISTS
FOR (e:Entity)
ON EACH [e.name, e.entityType]
"#;

const ALL_ENTITIES: &str = r#"
MATCH (e:Entity)
OPTIONAL MATCH (e)-[:HAS_OBSERVATION]->(o:Observation)
RETURN e.name AS name, e.entityType AS entityType,
       [x IN collect(o.content) WHERE x IS NOT NULL] AS observations
"#;

const ENTITIES_BY_NAME: &str = r#"
MATCH (e:Entity)
WHERE e.name IN $names
OPTIONAL MATCH (e)-[:HAS_OBSERVATION]->(o:Observation)
RETURN e.name AS name, e.entityType AS entityType,
       [x IN collect(o.content) WHERE x IS NOT NULL] AS observations
"#;

const RELATIONS_TOUCHING: &str = r#"
MATCH (from:Entity)-[r]->(to:Entity)
WHERE from.name IN $names OR to.name IN $names
RETURN from.name AS fromName, to.name AS toName, type(r) AS relationType
"#;

const FULLTEXT_SEARCH: &str = r#"
CALL db.index.fulltext.queryNodes("entity_fulltext", $query)
YIELD node, score
RETURN node.name AS name
ORDER BY score DESC
"#;

/// Lucene query syntax characters that must be escaped in full-text queries.
const LUCENE_SPECIAL: &[char] = &[
    '\\', '+', '-', '!', '(', ')', ':', '^', '[', ']', '"', '{', '}', '~', '*', '?', '|', '&',
    '/',
];

/// Relation type as a Cypher label, quoted after it passed validation.
///
/// Cypher cannot parameterize relationship types, so this is the only place
/// caller text is spliced into a query.
pub(crate) fn quote_relation_type(relation_type: &str) -> MemographResult<String> {
    if !is_valid_relation_type(relation_type) {
        return Err(MemographError::invalid_relation_type(relation_type));
    }
    Ok(format!("`{}`", relation_type))
}

/// Escape Lucene operators so user text is matched literally.
pub(crate) fn escape_fulltext_query(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if LUCENE_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn graph_err(context: &str) -> impl FnOnce(neo4rs::Error) -> MemographError + '_ {
    move |e| MemographError::graph_store_with_source(format!("{}: {}", context, e), e)
}

fn entity_from_row(row: &Row) -> Entity {
    Entity {
        name: row.get("name").unwrap_or_default(),
        entity_type: row.get("entityType").unwrap_or_default(),
        observations: row.get("observations").unwrap_or_default(),
    }
}

fn relation_from_row(row: &Row) -> Relation {
    Relation {
        from: row.get("fromName").unwrap_or_default(),
        to: row.get("toName").unwrap_or_default(),
        relation_type: row.get("relationType").unwrap_or_default(),
    }
}

struct Connection {
    graph: Graph,
    connected_at: Instant,
}

/// Neo4j graph store implementation.
pub struct Neo4jGraphStore {
    connection: RwLock<Connection>,
    config: GraphStoreConfig,
}

impl Neo4jGraphStore {
    /// Connect to the Neo4j server named by `config.url`.
    pub async fn new(config: GraphStoreConfig) -> MemographResult<Self> {
        let graph = Self::connect(&config).await?;
        info!(uri = %config.url, "Connected to Neo4j");
        Ok(Self {
            connection: RwLock::new(Connection {
                graph,
                connected_at: Instant::now(),
            }),
            config,
        })
    }

    async fn connect(config: &GraphStoreConfig) -> MemographResult<Graph> {
        let username = config.username.clone().unwrap_or_else(|| "neo4j".to_string());
        let password = config.password.clone().unwrap_or_default();

        let mut builder = ConfigBuilder::default()
            .uri(config.url.as_str())
            .user(username.as_str())
            .password(password.as_str())
            .max_connections(config.max_connections.max(1));
        if let Some(database) = &config.database {
            builder = builder.db(database.as_str());
        }

        let neo_config = builder.build().map_err(|e| MemographError::Connection {
            message: format!("Invalid Neo4j configuration: {}", e),
            code: ErrorCode::GrpConnectionFailed,
            source: Some(Box::new(e)),
        })?;

        Graph::connect(neo_config)
            .await
            .map_err(|e| MemographError::Connection {
                message: format!("Failed to connect to Neo4j at {}: {}", config.url, e),
                code: ErrorCode::GrpConnectionFailed,
                source: Some(Box::new(e)),
            })
    }

    fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.config.max_connection_lifetime_secs)
    }

    /// Current driver handle, replaced once it outlives the configured lifetime.
    async fn graph(&self) -> MemographResult<Graph> {
        {
            let connection = self.connection.read().await;
            if connection.connected_at.elapsed() < self.max_lifetime() {
                return Ok(connection.graph.clone());
            }
        }

        let mut connection = self.connection.write().await;
        if connection.connected_at.elapsed() >= self.max_lifetime() {
            debug!(uri = %self.config.url, "Neo4j connection exceeded max lifetime, reconnecting");
            connection.graph = Self::connect(&self.config).await?;
            connection.connected_at = Instant::now();
        }
        Ok(connection.graph.clone())
    }

    async fn fetch_rows(&self, q: Query, context: &str) -> MemographResult<Vec<Row>> {
        let graph = self.graph().await?;
        let mut stream = graph.execute(q).await.map_err(graph_err(context))?;

        let mut rows = Vec::new();
        while let Some(row) = stream.next().await.map_err(graph_err(context))? {
            rows.push(row);
        }
        Ok(rows)
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn ensure_schema(&self) -> MemographResult<()> {
        let graph = self.graph().await?;
        for statement in [CREATE_NAME_CONSTRAINT, CREATE_TYPE_INDEX, CREATE_FULLTEXT_INDEX] {
            graph
                .run(query(statement))
                .await
                .map_err(graph_err("Failed to create schema"))?;
        }
        Ok(())
    }

    async fn begin(&self) -> MemographResult<Box<dyn GraphTransaction>> {
        let graph = self.graph().await?;
        let txn = graph
            .start_txn()
            .await
            .map_err(|e| MemographError::Transaction {
                message: format!("Failed to begin transaction: {}", e),
                code: ErrorCode::TxnBeginFailed,
                source: Some(Box::new(e)),
            })?;
        Ok(Box::new(Neo4jTransaction { txn }))
    }

    async fn all_entities(&self) -> MemographResult<Vec<Entity>> {
        let rows = self
            .fetch_rows(query(ALL_ENTITIES), "Failed to load entities")
            .await?;
        Ok(rows.iter().map(entity_from_row).collect())
    }

    async fn fulltext_search(&self, raw: &str) -> MemographResult<Vec<String>> {
        let escaped = escape_fulltext_query(raw.trim());
        if escaped.is_empty() {
            return Ok(Vec::new());
        }

        let q = query(FULLTEXT_SEARCH).param("query", escaped);
        let rows = self.fetch_rows(q, "Failed to run full-text search").await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get::<String>("name").ok())
            .collect())
    }

    async fn entities_by_name(&self, names: &[String]) -> MemographResult<Vec<Entity>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let q = query(ENTITIES_BY_NAME).param("names", names.to_vec());
        let rows = self.fetch_rows(q, "Failed to load entities").await?;
        Ok(rows.iter().map(entity_from_row).collect())
    }

    async fn relations_touching(&self, names: &[String]) -> MemographResult<Vec<Relation>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let q = query(RELATIONS_TOUCHING).param("names", names.to_vec());
        let rows = self.fetch_rows(q, "Failed to load relations").await?;
        Ok(rows.iter().map(relation_from_row).collect())
    }

    async fn close(&self) -> MemographResult<()> {
        // neo4rs closes pooled connections when the last Graph handle drops.
        debug!(uri = %self.config.url, "Neo4j graph store closed");
        Ok(())
    }
}

/// An explicit Neo4j transaction.
pub struct Neo4jTransaction {
    txn: Txn,
}

impl Neo4jTransaction {
    async fn run(&mut self, q: Query, context: &str) -> MemographResult<()> {
        self.txn.run(q).await.map_err(graph_err(context))
    }

    async fn rows(&mut self, q: Query, context: &str) -> MemographResult<Vec<Row>> {
        let mut stream = self.txn.execute(q).await.map_err(graph_err(context))?;

        let mut rows = Vec::new();
        while let Some(row) = stream
            .next(self.txn.handle())
            .await
            .map_err(graph_err(context))?
        {
            rows.push(row);
        }
        Ok(rows)
    }
}

#[async_trait]
impl GraphTransaction for Neo4jTransaction {
    async fn entity_names(&mut self) -> MemographResult<HashSet<String>> {
        let rows = self
            .rows(
                query("MATCH (e:Entity) RETURN e.name AS name"),
                "Failed to load entity names",
            )
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get::<String>("name").ok())
            .collect())
    }

    async fn entity_exists(&mut self, name: &str) -> MemographResult<bool> {
        let q = query("MATCH (e:Entity {name: $name}) RETURN e.name AS name").param("name", name);
        let rows = self.rows(q, "Failed to look up entity").await?;
        Ok(!rows.is_empty())
    }

    async fn insert_entity(&mut self, entity: &Entity) -> MemographResult<()> {
        let q = query(
            r#"
            CREATE (e:Entity {name: $name, entityType: $entityType})
            FOREACH (content IN $observations |
                CREATE (e)-[:HAS_OBSERVATION]->(:Observation {content: content}))
            "#,
        )
        .param("name", entity.name.as_str())
        .param("entityType", entity.entity_type.as_str())
        .param("observations", entity.observations.clone());
        self.run(q, "Failed to create entity").await
    }

    async fn delete_entities(&mut self, names: &[String]) -> MemographResult<()> {
        let q = query(
            r#"
            UNWIND $names AS name
            MATCH (e:Entity {name: name})
            OPTIONAL MATCH (e)-[:HAS_OBSERVATION]->(o:Observation)
            DETACH DELETE e, o
            "#,
        )
        .param("names", names.to_vec());
        self.run(q, "Failed to delete entities").await
    }

    async fn relation_triples(&mut self) -> MemographResult<HashSet<Relation>> {
        let q = query(
            r#"
            MATCH (from:Entity)-[r]->(to:Entity)
            RETURN from.name AS fromName, to.name AS toName, type(r) AS relationType
            "#,
        );
        let rows = self.rows(q, "Failed to load relations").await?;
        Ok(rows.iter().map(relation_from_row).collect())
    }

    async fn insert_relation(&mut self, relation: &Relation) -> MemographResult<()> {
        let label = quote_relation_type(&relation.relation_type)?;
        let q = query(&format!(
            r#"
            MATCH (from:Entity {{name: $fromName}})
            MATCH (to:Entity {{name: $toName}})
            CREATE (from)-[:{}]->(to)
            "#,
            label
        ))
        .param("fromName", relation.from.as_str())
        .param("toName", relation.to.as_str());
        self.run(q, "Failed to create relation").await
    }

    async fn delete_relation(&mut self, relation: &Relation) -> MemographResult<()> {
        let label = quote_relation_type(&relation.relation_type)?;
        let q = query(&format!(
            r#"
            MATCH (from:Entity {{name: $fromName}})-[r:{}]->(to:Entity {{name: $toName}})
            DELETE r
            "#,
            label
        ))
        .param("fromName", relation.from.as_str())
        .param("toName", relation.to.as_str());
        self.run(q, "Failed to delete relation").await
    }

    async fn observation_contents(
        &mut self,
        entity_name: &str,
    ) -> MemographResult<HashSet<String>> {
        let q = query(
            r#"
            MATCH (e:Entity {name: $name})-[:HAS_OBSERVATION]->(o:Observation)
            RETURN o.content AS content
            "#,
        )
        .param("name", entity_name);
        let rows = self.rows(q, "Failed to load observations").await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get::<String>("content").ok())
            .collect())
    }

    async fn insert_observations(
        &mut self,
        entity_name: &str,
        contents: &[String],
    ) -> MemographResult<()> {
        let q = query(
            r#"
            MATCH (e:Entity {name: $name})
            UNWIND $contents AS content
            CREATE (e)-[:HAS_OBSERVATION]->(:Observation {content: content})
            "#,
        )
        .param("name", entity_name)
        .param("contents", contents.to_vec());
        self.run(q, "Failed to add observations").await
    }

    async fn delete_observations(
        &mut self,
        entity_name: &str,
        contents: &[String],
    ) -> MemographResult<()> {
        let q = query(
            r#"
            MATCH (e:Entity {name: $name})-[:HAS_OBSERVATION]->(o:Observation)
            WHERE o.content IN $contents
            DETACH DELETE o
            "#,
        )
        .param("name", entity_name)
        .param("contents", contents.to_vec());
        self.run(q, "Failed to delete observations").await
    }

    async fn commit(self: Box<Self>) -> MemographResult<()> {
        self.txn
            .commit()
            .await
            .map_err(|e| MemographError::Transaction {
                message: format!("Failed to commit transaction: {}", e),
                code: ErrorCode::TxnCommitFailed,
                source: Some(Box::new(e)),
            })
    }

    async fn rollback(self: Box<Self>) -> MemographResult<()> {
        self.txn
            .rollback()
            .await
            .map_err(|e| MemographError::Transaction {
                message: format!("Failed to roll back transaction: {}", e),
                code: ErrorCode::TxnRollbackFailed,
                source: Some(Box::new(e)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_relation_type() {
        assert_eq!(quote_relation_type("WORKS_FOR").unwrap(), "`WORKS_FOR`");
        assert_eq!(quote_relation_type("就职于").unwrap(), "`就职于`");
        assert!(quote_relation_type("A]->(b").is_err());
        assert!(quote_relation_type("works for").is_err());
        assert!(quote_relation_type("x`y").is_err());
        assert!(quote_relation_type("").is_err());
    }

    #[test]
    fn test_escape_fulltext_query() {
        assert_eq!(escape_fulltext_query("john"), "john");
        assert_eq!(escape_fulltext_query("a+b"), "a\\+b");
        assert_eq!(escape_fulltext_query("(x)"), "\\(x\\)");
        assert_eq!(escape_fulltext_query("c:\\"), "c\\:\\\\");
    }

    #[test]
    fn test_invalid_relation_type_is_validation_error() {
        let err = quote_relation_type("DROP ALL").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValInvalidRelationType);
    }
}
