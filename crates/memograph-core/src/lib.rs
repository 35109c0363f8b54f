//! memograph-core - Core library for memograph.
//!
//! This crate provides the data model, graph store traits, search mirror and
//! the [`KnowledgeGraphManager`] for a persistent labeled knowledge graph:
//! typed entities carrying observations, connected by typed directed relations.
//!
//! # Example
//!
//! ```ignore
//! use memograph_core::{Entity, KnowledgeGraphManager, ManagerConfig, Relation};
//!
//! let manager = KnowledgeGraphManager::new(connector, ManagerConfig::default());
//!
//! manager
//!     .create_entities(vec![Entity::new("John", "Person").with_observation("likes coding")])
//!     .await?;
//! manager
//!     .create_relations(vec![Relation::new("John", "Acme", "WORKS_FOR")])
//!     .await?;
//!
//! let graph = manager.search_nodes("john").await?;
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod retrieval;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{ManagerConfig, SearchConfig};
pub use error::{ErrorCode, MemographError, MemographResult};
pub use manager::{KnowledgeGraphManager, ManagerState};
pub use retrieval::SearchMirror;
pub use traits::{
    GraphStore, GraphStoreConfig, GraphStoreConnector, GraphStoreProvider, GraphTransaction,
};
pub use types::{Entity, KnowledgeGraph, ObservationDeletion, ObservationInput, Relation};
