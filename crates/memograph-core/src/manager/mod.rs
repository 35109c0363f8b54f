//! Knowledge graph manager.
//!
//! Orchestrates every mutation and query against a [`GraphStore`]: it runs
//! each read-then-write dedup sequence inside one transaction, and keeps the
//! [`SearchMirror`] in step with the store by rebuilding it as the last step
//! of every mutation that touches entities or observations.
//!
//! The manager holds no operation-level lock. Isolation between concurrent
//! calls is whatever the backing store's transactions provide.

mod entities;
mod observations;
mod queries;
mod relations;

use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::ManagerConfig;
use crate::error::MemographResult;
use crate::retrieval::SearchMirror;
use crate::traits::{GraphStore, GraphStoreConnector, GraphTransaction};

/// Lifecycle of a [`KnowledgeGraphManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// No connection has been opened yet.
    Uninitialized,
    /// A connection is being opened.
    Initializing,
    /// Connected, schema ensured, mirror loaded.
    Ready,
    /// Closed by the caller. The next operation re-initializes.
    Closed,
}

/// Main knowledge graph manager.
pub struct KnowledgeGraphManager {
    config: ManagerConfig,
    connector: Arc<dyn GraphStoreConnector>,
    store: Mutex<Option<Arc<dyn GraphStore>>>,
    state: RwLock<ManagerState>,
    mirror: SearchMirror,
}

impl KnowledgeGraphManager {
    /// Create a manager. No connection is opened until the first operation
    /// or an explicit [`initialize`](Self::initialize).
    pub fn new(connector: Arc<dyn GraphStoreConnector>, config: ManagerConfig) -> Self {
        Self {
            config,
            connector,
            store: Mutex::new(None),
            state: RwLock::new(ManagerState::Uninitialized),
            mirror: SearchMirror::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ManagerState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// The configuration resolved at construction.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The in-memory fuzzy index.
    pub fn mirror(&self) -> &SearchMirror {
        &self.mirror
    }

    /// Connect, ensure the schema and load the search mirror.
    ///
    /// Concurrent callers share one connection attempt. Once ready this is a no-op.
    pub async fn initialize(&self) -> MemographResult<()> {
        self.store().await.map(|_| ())
    }

    /// Release the connection and drop the mirror.
    pub async fn close(&self) -> MemographResult<()> {
        let mut slot = self.store.lock().await;
        let Some(store) = slot.take() else {
            return Ok(());
        };

        self.mirror.clear();
        self.set_state(ManagerState::Closed);
        info!("Knowledge graph manager closed");

        store.close().await.map_err(|err| {
            warn!(error = %err, "Error while closing graph store");
            err
        })
    }

    /// The ready store, initializing on first use.
    async fn store(&self) -> MemographResult<Arc<dyn GraphStore>> {
        let mut slot = self.store.lock().await;
        if let Some(store) = slot.as_ref() {
            return Ok(Arc::clone(store));
        }

        self.set_state(ManagerState::Initializing);
        match self.connect().await {
            Ok(store) => {
                *slot = Some(Arc::clone(&store));
                self.set_state(ManagerState::Ready);
                info!(
                    provider = ?self.config.graph_store.provider,
                    entities = self.mirror.len(),
                    "Knowledge graph manager ready"
                );
                Ok(store)
            }
            Err(err) => {
                self.set_state(ManagerState::Uninitialized);
                error!(error = %err, "Failed to initialize database");
                Err(err)
            }
        }
    }

    async fn connect(&self) -> MemographResult<Arc<dyn GraphStore>> {
        let store = self.connector.connect().await?;

        let prepared = async {
            store.ensure_schema().await?;
            store.all_entities().await
        }
        .await;

        match prepared {
            Ok(entities) => {
                self.mirror.replace(entities);
                Ok(store)
            }
            Err(err) => {
                if let Err(close_err) = store.close().await {
                    warn!(error = %close_err, "Error while closing graph store after failed initialization");
                }
                Err(err)
            }
        }
    }

    fn set_state(&self, state: ManagerState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Run `body` in one transaction: commit on `Ok`, roll back on `Err`.
    ///
    /// The transaction is consumed on every path, which releases its session.
    async fn with_transaction<T, F>(
        &self,
        store: &dyn GraphStore,
        operation: &'static str,
        body: F,
    ) -> MemographResult<T>
    where
        T: Send + 'static,
        F: for<'t> FnOnce(&'t mut dyn GraphTransaction) -> BoxFuture<'t, MemographResult<T>>
            + Send,
    {
        let mut tx = store.begin().await.map_err(|err| {
            error!(operation, error = %err, "Failed to begin transaction");
            err
        })?;

        let outcome = body(tx.as_mut()).await;

        match outcome {
            Ok(value) => {
                tx.commit().await.map_err(|err| {
                    error!(operation, error = %err, "Failed to commit transaction");
                    err
                })?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(operation, error = %rollback_err, "Rollback failed");
                }
                error!(operation, error = %err, "Error in {}, transaction rolled back", operation);
                Err(err)
            }
        }
    }

    /// Re-read every entity from the store and swap the mirror.
    async fn refresh_mirror(&self, store: &dyn GraphStore) -> MemographResult<()> {
        let entities = store.all_entities().await.map_err(|err| {
            error!(error = %err, "Failed to rebuild search mirror");
            err
        })?;
        debug!(entities = entities.len(), "Search mirror rebuilt");
        self.mirror.replace(entities);
        Ok(())
    }
}
