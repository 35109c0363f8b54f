//! Failure handling of the knowledge graph manager: rollback, degraded reads
//! and initialization errors, driven by a fault-injecting store wrapper.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use memograph_core::{
    Entity, ErrorCode, GraphStore, GraphStoreConnector, GraphTransaction, KnowledgeGraphManager,
    ManagerConfig, ManagerState, MemographError, MemographResult, Relation,
};
use memograph_graph_stores::EmbeddedGraphStore;

#[derive(Default)]
struct Faults {
    insert_entity: Mutex<Option<String>>,
    commit: AtomicBool,
    fulltext: AtomicBool,
    entities_by_name: AtomicBool,
    all_entities: AtomicBool,
    closes: AtomicUsize,
}

fn injected(what: &str) -> MemographError {
    MemographError::graph_store(format!("injected {} failure", what))
}

/// Delegates to an embedded store, failing where `faults` says so.
struct FaultyStore {
    inner: Arc<EmbeddedGraphStore>,
    faults: Arc<Faults>,
}

#[async_trait]
impl GraphStore for FaultyStore {
    async fn ensure_schema(&self) -> MemographResult<()> {
        self.inner.ensure_schema().await
    }

    async fn begin(&self) -> MemographResult<Box<dyn GraphTransaction>> {
        let inner = self.inner.begin().await?;
        Ok(Box::new(FaultyTransaction {
            inner,
            faults: Arc::clone(&self.faults),
        }))
    }

    async fn all_entities(&self) -> MemographResult<Vec<Entity>> {
        if self.faults.all_entities.load(Ordering::SeqCst) {
            return Err(injected("all_entities"));
        }
        self.inner.all_entities().await
    }

    async fn fulltext_search(&self, query: &str) -> MemographResult<Vec<String>> {
        if self.faults.fulltext.load(Ordering::SeqCst) {
            return Err(injected("fulltext_search"));
        }
        self.inner.fulltext_search(query).await
    }

    async fn entities_by_name(&self, names: &[String]) -> MemographResult<Vec<Entity>> {
        if self.faults.entities_by_name.load(Ordering::SeqCst) {
            return Err(injected("entities_by_name"));
        }
        self.inner.entities_by_name(names).await
    }

    async fn relations_touching(&self, names: &[String]) -> MemographResult<Vec<Relation>> {
        self.inner.relations_touching(names).await
    }

    async fn close(&self) -> MemographResult<()> {
        self.faults.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close().await
    }
}

struct FaultyTransaction {
    inner: Box<dyn GraphTransaction>,
    faults: Arc<Faults>,
}

#[async_trait]
impl GraphTransaction for FaultyTransaction {
    async fn entity_names(&mut self) -> MemographResult<HashSet<String>> {
        self.inner.entity_names().await
    }

    async fn entity_exists(&mut self, name: &str) -> MemographResult<bool> {
        self.inner.entity_exists(name).await
    }

    async fn insert_entity(&mut self, entity: &Entity) -> MemographResult<()> {
        let poisoned = self.faults.insert_entity.lock().unwrap().clone();
        if poisoned.as_deref() == Some(entity.name.as_str()) {
            return Err(injected("insert_entity"));
        }
        self.inner.insert_entity(entity).await
    }

    async fn delete_entities(&mut self, names: &[String]) -> MemographResult<()> {
        self.inner.delete_entities(names).await
    }

    async fn relation_triples(&mut self) -> MemographResult<HashSet<Relation>> {
        self.inner.relation_triples().await
    }

    async fn insert_relation(&mut self, relation: &Relation) -> MemographResult<()> {
        self.inner.insert_relation(relation).await
    }

    async fn delete_relation(&mut self, relation: &Relation) -> MemographResult<()> {
        self.inner.delete_relation(relation).await
    }

    async fn observation_contents(
        &mut self,
        entity_name: &str,
    ) -> MemographResult<HashSet<String>> {
        self.inner.observation_contents(entity_name).await
    }

    async fn insert_observations(
        &mut self,
        entity_name: &str,
        contents: &[String],
    ) -> MemographResult<()> {
        self.inner.insert_observations(entity_name, contents).await
    }

    async fn delete_observations(
        &mut self,
        entity_name: &str,
        contents: &[String],
    ) -> MemographResult<()> {
        self.inner.delete_observations(entity_name, contents).await
    }

    async fn commit(self: Box<Self>) -> MemographResult<()> {
        if self.faults.commit.load(Ordering::SeqCst) {
            self.inner.rollback().await?;
            return Err(MemographError::transaction(
                ErrorCode::TxnCommitFailed,
                "injected commit failure",
            ));
        }
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> MemographResult<()> {
        self.inner.rollback().await
    }
}

/// Hands out the faulty store, or fails to connect while `refuse` is set.
struct FlakyConnector {
    store: Arc<FaultyStore>,
    refuse: AtomicBool,
    attempts: AtomicUsize,
}

#[async_trait]
impl GraphStoreConnector for FlakyConnector {
    async fn connect(&self) -> MemographResult<Arc<dyn GraphStore>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            return Err(MemographError::connection("injected connection refusal"));
        }
        let store: Arc<dyn GraphStore> = self.store.clone();
        Ok(store)
    }
}

struct Harness {
    manager: KnowledgeGraphManager,
    connector: Arc<FlakyConnector>,
    faults: Arc<Faults>,
    inner: Arc<EmbeddedGraphStore>,
}

fn harness() -> Harness {
    let inner = Arc::new(EmbeddedGraphStore::in_memory().unwrap());
    let faults = Arc::new(Faults::default());
    let connector = Arc::new(FlakyConnector {
        store: Arc::new(FaultyStore {
            inner: Arc::clone(&inner),
            faults: Arc::clone(&faults),
        }),
        refuse: AtomicBool::new(false),
        attempts: AtomicUsize::new(0),
    });
    let manager = KnowledgeGraphManager::new(connector.clone(), ManagerConfig::default());
    Harness {
        manager,
        connector,
        faults,
        inner,
    }
}

#[tokio::test]
async fn test_failed_insert_rolls_back_whole_batch() {
    let h = harness();
    *h.faults.insert_entity.lock().unwrap() = Some("Second".to_string());

    let result = h
        .manager
        .create_entities(vec![
            Entity::new("First", "Thing"),
            Entity::new("Second", "Thing"),
        ])
        .await;

    assert!(result.is_err());
    assert_eq!(h.inner.entity_count().await.unwrap(), 0);
    assert!(!h.manager.mirror().contains("First"));

    // The session was released; the next call goes through.
    *h.faults.insert_entity.lock().unwrap() = None;
    let created = h
        .manager
        .create_entities(vec![Entity::new("First", "Thing")])
        .await
        .unwrap();
    assert_eq!(created.len(), 1);
}

#[tokio::test]
async fn test_failed_commit_leaves_store_unchanged() {
    let h = harness();
    h.faults.commit.store(true, Ordering::SeqCst);

    let err = h
        .manager
        .create_entities(vec![Entity::new("John", "Person")])
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::TxnCommitFailed);
    assert_eq!(h.inner.entity_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_search_degrades_to_empty_on_read_failure() {
    let h = harness();
    h.manager
        .create_entities(vec![Entity::new("John", "Person")])
        .await
        .unwrap();
    h.faults.fulltext.store(true, Ordering::SeqCst);

    let graph = h.manager.search_nodes("john").await.unwrap();
    assert!(graph.is_empty());

    h.faults.fulltext.store(false, Ordering::SeqCst);
    let graph = h.manager.search_nodes("john").await.unwrap();
    assert_eq!(graph.entity_names(), vec!["John"]);
}

#[tokio::test]
async fn test_open_nodes_degrades_to_empty_on_read_failure() {
    let h = harness();
    h.manager
        .create_entities(vec![Entity::new("John", "Person")])
        .await
        .unwrap();
    h.faults.entities_by_name.store(true, Ordering::SeqCst);

    let graph = h.manager.open_nodes(vec!["John".to_string()]).await.unwrap();
    assert!(graph.is_empty());
}

#[tokio::test]
async fn test_connection_failure_propagates_and_is_retried() {
    let h = harness();
    h.connector.refuse.store(true, Ordering::SeqCst);

    let err = h.manager.search_nodes("john").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::GrpConnectionFailed);
    assert_eq!(h.manager.state(), ManagerState::Uninitialized);

    assert!(h
        .manager
        .open_nodes(vec!["John".to_string()])
        .await
        .is_err());

    h.connector.refuse.store(false, Ordering::SeqCst);
    h.manager.initialize().await.unwrap();
    assert_eq!(h.manager.state(), ManagerState::Ready);
    assert_eq!(h.connector.attempts.load(Ordering::SeqCst), 3);

    // Ready managers do not reconnect.
    h.manager.initialize().await.unwrap();
    assert_eq!(h.connector.attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_failed_mirror_load_closes_store() {
    let h = harness();
    h.faults.all_entities.store(true, Ordering::SeqCst);

    assert!(h.manager.initialize().await.is_err());
    assert_eq!(h.manager.state(), ManagerState::Uninitialized);
    assert_eq!(h.faults.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_mirror_rebuild_failure_propagates_after_commit() {
    let h = harness();
    h.manager.initialize().await.unwrap();
    h.faults.all_entities.store(true, Ordering::SeqCst);

    let result = h
        .manager
        .create_entities(vec![Entity::new("John", "Person")])
        .await;
    assert!(result.is_err());
    assert_eq!(h.inner.entity_count().await.unwrap(), 1);
    assert!(!h.manager.mirror().contains("John"));

    // Retrying is safe: nothing new is created and the mirror catches up.
    h.faults.all_entities.store(false, Ordering::SeqCst);
    let created = h
        .manager
        .create_entities(vec![Entity::new("John", "Person")])
        .await
        .unwrap();
    assert!(created.is_empty());
    assert!(h.manager.mirror().contains("John"));
}
