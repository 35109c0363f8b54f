//! In-memory fuzzy index over the entity set.
//!
//! The mirror is rebuilt wholesale from the graph store and published with a
//! single atomic pointer swap, so readers always see one complete snapshot.

use std::cmp::Ordering;
use std::sync::Arc;

use arc_swap::ArcSwap;

use super::fuzzy::{fold, FuzzyMatcher};
use crate::config::SearchConfig;
use crate::types::Entity;

/// One indexed entity with its case-folded searchable fields.
#[derive(Debug)]
struct MirrorEntry {
    entity: Entity,
    fields: Vec<Vec<char>>,
}

impl MirrorEntry {
    fn new(entity: Entity) -> Self {
        let mut fields = Vec::with_capacity(entity.observations.len() + 2);
        fields.push(fold(&entity.name));
        fields.push(fold(&entity.entity_type));
        fields.extend(entity.observations.iter().map(|o| fold(o)));
        Self { entity, fields }
    }
}

#[derive(Debug, Default)]
struct MirrorIndex {
    entries: Vec<MirrorEntry>,
}

/// Derived fuzzy-search index, replaced after every mutation.
#[derive(Debug, Default)]
pub struct SearchMirror {
    index: ArcSwap<MirrorIndex>,
}

impl SearchMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole index with `entities`.
    pub fn replace(&self, entities: Vec<Entity>) {
        let entries = entities.into_iter().map(MirrorEntry::new).collect();
        self.index.store(Arc::new(MirrorIndex { entries }));
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.index.store(Arc::new(MirrorIndex::default()));
    }

    /// Number of indexed entities.
    pub fn len(&self) -> usize {
        self.index.load().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an entity with `name` is indexed.
    pub fn contains(&self, name: &str) -> bool {
        self.index
            .load()
            .entries
            .iter()
            .any(|entry| entry.entity.name == name)
    }

    /// Entities matching `query` within the configured threshold, best first.
    /// Equal scores keep index order.
    pub fn search(&self, query: &str, config: &SearchConfig) -> Vec<Entity> {
        let Some(matcher) = FuzzyMatcher::new(query, config) else {
            return Vec::new();
        };

        let index = self.index.load();
        let mut hits: Vec<(f64, &MirrorEntry)> = index
            .entries
            .iter()
            .filter_map(|entry| {
                matcher
                    .best_score(entry.fields.iter().map(Vec::as_slice))
                    .map(|score| (score, entry))
            })
            .collect();

        hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        hits.into_iter().map(|(_, entry)| entry.entity.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Entity> {
        vec![
            Entity::new("John", "Person").with_observation("likes coding"),
            Entity::new("Acme", "Company").with_observation("makes widgets"),
            Entity::new("Jon", "Person"),
        ]
    }

    #[test]
    fn test_replace_and_len() {
        let mirror = SearchMirror::new();
        assert!(mirror.is_empty());
        mirror.replace(sample());
        assert_eq!(mirror.len(), 3);
        assert!(mirror.contains("Acme"));
        mirror.replace(vec![Entity::new("Solo", "Thing")]);
        assert_eq!(mirror.len(), 1);
        assert!(!mirror.contains("Acme"));
    }

    #[test]
    fn test_search_matches_observations() {
        let mirror = SearchMirror::new();
        mirror.replace(sample());
        let hits = mirror.search("widgets", &SearchConfig::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Acme");
    }

    #[test]
    fn test_search_orders_by_score() {
        let mirror = SearchMirror::new();
        mirror.replace(sample());
        let hits = mirror.search("john", &SearchConfig::default());
        let names: Vec<&str> = hits.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["John", "Jon"]);
    }

    #[test]
    fn test_blank_query_and_clear() {
        let mirror = SearchMirror::new();
        mirror.replace(sample());
        assert!(mirror.search("  ", &SearchConfig::default()).is_empty());
        mirror.clear();
        assert!(mirror.search("john", &SearchConfig::default()).is_empty());
    }
}
