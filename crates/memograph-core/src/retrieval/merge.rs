//! Merge of store-index hits and fuzzy hits.

use std::collections::HashSet;

use crate::types::Entity;

/// Combine two ranked hit lists into one, de-duplicated by entity name.
///
/// Store hits come first and win over a fuzzy hit with the same name; fuzzy
/// hits not already present are appended. Each list keeps its own order.
pub fn merge_hits(store_hits: Vec<Entity>, fuzzy_hits: Vec<Entity>) -> Vec<Entity> {
    let mut seen = HashSet::with_capacity(store_hits.len() + fuzzy_hits.len());
    let mut merged = Vec::with_capacity(store_hits.len() + fuzzy_hits.len());

    for entity in store_hits.into_iter().chain(fuzzy_hits) {
        if seen.insert(entity.name.clone()) {
            merged.push(entity);
        }
    }

    merged
}
