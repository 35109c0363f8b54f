//! Retrieval over the knowledge graph.
//!
//! Two strategies feed `search_nodes`:
//! - Store index: the backend's exact/full-text index over name and type
//! - Search mirror: an in-memory fuzzy index over name, type and observations
//!
//! [`merge_hits`] combines them into one de-duplicated ranking.

mod fuzzy;
mod merge;
mod mirror;

pub use fuzzy::FuzzyMatcher;
pub use merge::merge_hits;
pub use mirror::SearchMirror;
