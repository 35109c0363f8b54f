//! Embedded graph store backed by SQLite.
//!
//! The whole graph lives in one SQLite database (see [`schema`]). A single
//! connection is shared behind an async mutex; a transaction owns the lock
//! from `BEGIN IMMEDIATE` until commit or rollback, so transactions are
//! serialized and each one sees a consistent graph.

pub mod queries;
pub mod schema;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use memograph_core::error::{ErrorCode, MemographError, MemographResult};
use memograph_core::traits::{GraphStore, GraphStoreConfig, GraphTransaction};
use memograph_core::types::{Entity, Relation};

/// Embedded graph store using SQLite.
pub struct EmbeddedGraphStore {
    conn: Arc<Mutex<Connection>>,
}

impl EmbeddedGraphStore {
    /// Open (or create) an embedded store at the given database path.
    pub fn new(db_path: impl AsRef<Path>) -> MemographResult<Self> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path.as_ref()).map_err(|e| MemographError::Connection {
            message: format!(
                "Failed to open embedded graph store at {}: {}",
                db_path.as_ref().display(),
                e
            ),
            code: ErrorCode::DbConnectionFailed,
            source: Some(Box::new(e)),
        })?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        conn.busy_timeout(std::time::Duration::from_secs(10))?;
        schema::init_schema(&conn)?;

        Ok(Self::from_connection(conn))
    }

    /// Create a new in-memory embedded store.
    pub fn in_memory() -> MemographResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Create from a GraphStoreConfig.
    pub async fn from_config(config: &GraphStoreConfig) -> MemographResult<Self> {
        // URL is the database path for embedded store
        if config.url.is_empty() || config.url == ":memory:" {
            Self::in_memory()
        } else {
            Self::new(&config.url)
        }
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Number of stored entities.
    pub async fn entity_count(&self) -> MemographResult<usize> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Number of stored relations.
    pub async fn relation_count(&self) -> MemographResult<usize> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM relations", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Number of stored observation records.
    pub async fn observation_count(&self) -> MemographResult<usize> {
        let conn = self.conn.lock().await;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM observations", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl GraphStore for EmbeddedGraphStore {
    async fn ensure_schema(&self) -> MemographResult<()> {
        let conn = self.conn.lock().await;
        schema::init_schema(&conn)
    }

    async fn begin(&self) -> MemographResult<Box<dyn GraphTransaction>> {
        let conn = Arc::clone(&self.conn).lock_owned().await;
        conn.execute_batch("BEGIN IMMEDIATE").map_err(|e| MemographError::Transaction {
            message: format!("Failed to begin transaction: {}", e),
            code: ErrorCode::TxnBeginFailed,
            source: Some(Box::new(e)),
        })?;
        Ok(Box::new(EmbeddedTransaction {
            conn,
            finished: false,
        }))
    }

    async fn all_entities(&self) -> MemographResult<Vec<Entity>> {
        let conn = self.conn.lock().await;
        queries::load_entities(&conn, None)
    }

    async fn fulltext_search(&self, query: &str) -> MemographResult<Vec<String>> {
        let conn = self.conn.lock().await;
        queries::fulltext_search(&conn, query)
    }

    async fn entities_by_name(&self, names: &[String]) -> MemographResult<Vec<Entity>> {
        let conn = self.conn.lock().await;
        queries::load_entities(&conn, Some(names))
    }

    async fn relations_touching(&self, names: &[String]) -> MemographResult<Vec<Relation>> {
        let conn = self.conn.lock().await;
        queries::relations_touching(&conn, names)
    }

    async fn close(&self) -> MemographResult<()> {
        // The connection closes when the last handle to the store is dropped.
        let conn = self.conn.lock().await;
        conn.execute_batch("PRAGMA optimize")?;
        debug!("Embedded graph store closed");
        Ok(())
    }
}

/// A SQLite transaction holding the store's connection lock.
///
/// Dropping an unfinished transaction rolls it back.
pub struct EmbeddedTransaction {
    conn: OwnedMutexGuard<Connection>,
    finished: bool,
}

#[async_trait]
impl GraphTransaction for EmbeddedTransaction {
    async fn entity_names(&mut self) -> MemographResult<HashSet<String>> {
        queries::entity_names(&self.conn)
    }

    async fn entity_exists(&mut self, name: &str) -> MemographResult<bool> {
        queries::entity_exists(&self.conn, name)
    }

    async fn insert_entity(&mut self, entity: &Entity) -> MemographResult<()> {
        queries::insert_entity(&self.conn, entity)
    }

    async fn delete_entities(&mut self, names: &[String]) -> MemographResult<()> {
        queries::delete_entities(&self.conn, names)
    }

    async fn relation_triples(&mut self) -> MemographResult<HashSet<Relation>> {
        queries::relation_triples(&self.conn)
    }

    async fn insert_relation(&mut self, relation: &Relation) -> MemographResult<()> {
        queries::insert_relation(&self.conn, relation)
    }

    async fn delete_relation(&mut self, relation: &Relation) -> MemographResult<()> {
        queries::delete_relation(&self.conn, relation)
    }

    async fn observation_contents(
        &mut self,
        entity_name: &str,
    ) -> MemographResult<HashSet<String>> {
        queries::observation_contents(&self.conn, entity_name)
    }

    async fn insert_observations(
        &mut self,
        entity_name: &str,
        contents: &[String],
    ) -> MemographResult<()> {
        queries::insert_observations(&self.conn, entity_name, contents)
    }

    async fn delete_observations(
        &mut self,
        entity_name: &str,
        contents: &[String],
    ) -> MemographResult<()> {
        queries::delete_observations(&self.conn, entity_name, contents)
    }

    async fn commit(mut self: Box<Self>) -> MemographResult<()> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| MemographError::Transaction {
                message: format!("Failed to commit transaction: {}", e),
                code: ErrorCode::TxnCommitFailed,
                source: Some(Box::new(e)),
            })?;
        self.finished = true;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> MemographResult<()> {
        self.finished = true;
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| MemographError::Transaction {
                message: format!("Failed to roll back transaction: {}", e),
                code: ErrorCode::TxnRollbackFailed,
                source: Some(Box::new(e)),
            })
    }
}

impl Drop for EmbeddedTransaction {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                warn!(error = %e, "Failed to roll back abandoned transaction");
            }
        }
    }
}
