//! Read-only retrieval: `search_nodes` and `open_nodes`.
//!
//! Read failures are logged and degrade to an empty graph; only a failure to
//! initialize the store reaches the caller.

use std::collections::HashMap;

use tracing::{debug, error};

use super::KnowledgeGraphManager;
use crate::error::MemographResult;
use crate::retrieval::merge_hits;
use crate::traits::GraphStore;
use crate::types::{Entity, KnowledgeGraph};

impl KnowledgeGraphManager {
    /// Search by full-text index and fuzzy mirror, merged by entity name.
    ///
    /// Store hits come first; fuzzy hits not already present follow. The
    /// returned relations are every relation with at least one endpoint among
    /// the matched entities.
    pub async fn search_nodes(&self, query: &str) -> MemographResult<KnowledgeGraph> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(KnowledgeGraph::empty());
        }

        let store = self.store().await?;
        match self.search_store_and_mirror(store.as_ref(), query).await {
            Ok(graph) => Ok(graph),
            Err(err) => {
                error!(error = %err, query, "Error searching nodes");
                Ok(KnowledgeGraph::empty())
            }
        }
    }

    /// Fetch exactly the named entities and the relations touching them.
    pub async fn open_nodes(&self, names: Vec<String>) -> MemographResult<KnowledgeGraph> {
        if names.is_empty() {
            return Ok(KnowledgeGraph::empty());
        }

        let store = self.store().await?;
        match open_named(store.as_ref(), &names).await {
            Ok(graph) => Ok(graph),
            Err(err) => {
                error!(error = %err, "Error opening nodes");
                Ok(KnowledgeGraph::empty())
            }
        }
    }

    async fn search_store_and_mirror(
        &self,
        store: &dyn GraphStore,
        query: &str,
    ) -> MemographResult<KnowledgeGraph> {
        let ranked_names = store.fulltext_search(query).await?;
        let store_hits = resolve_in_rank_order(store, ranked_names).await?;
        let fuzzy_hits = self.mirror.search(query, &self.config.search);

        debug!(
            store_hits = store_hits.len(),
            fuzzy_hits = fuzzy_hits.len(),
            "Merging search results"
        );

        let entities = merge_hits(store_hits, fuzzy_hits);
        if entities.is_empty() {
            return Ok(KnowledgeGraph::empty());
        }

        let names: Vec<String> = entities.iter().map(|e| e.name.clone()).collect();
        let relations = store.relations_touching(&names).await?;
        Ok(KnowledgeGraph::new(entities, relations))
    }
}

async fn open_named(store: &dyn GraphStore, names: &[String]) -> MemographResult<KnowledgeGraph> {
    let entities = store.entities_by_name(names).await?;
    if entities.is_empty() {
        return Ok(KnowledgeGraph::new(entities, Vec::new()));
    }

    let found: Vec<String> = entities.iter().map(|e| e.name.clone()).collect();
    let relations = store.relations_touching(&found).await?;
    Ok(KnowledgeGraph::new(entities, relations))
}

/// Load full entities for index hits, keeping the index's ranking.
async fn resolve_in_rank_order(
    store: &dyn GraphStore,
    ranked_names: Vec<String>,
) -> MemographResult<Vec<Entity>> {
    if ranked_names.is_empty() {
        return Ok(Vec::new());
    }

    let mut by_name: HashMap<String, Entity> = store
        .entities_by_name(&ranked_names)
        .await?
        .into_iter()
        .map(|e| (e.name.clone(), e))
        .collect();

    Ok(ranked_names
        .into_iter()
        .filter_map(|name| by_name.remove(&name))
        .collect())
}
