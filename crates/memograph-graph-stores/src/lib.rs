//! memograph-graph-stores - Graph store implementations for memograph.
//!
//! # Supported Backends
//!
//! - **Neo4j** (feature: `neo4j`) - Neo4j graph database over Bolt
//! - **Embedded** (feature: `embedded`, default) - single-file SQLite database

mod factory;

#[cfg(feature = "neo4j")]
mod neo4j;

#[cfg(feature = "embedded")]
pub mod embedded;

pub use factory::{ConfiguredConnector, GraphStoreFactory};

#[cfg(feature = "neo4j")]
pub use neo4j::{Neo4jGraphStore, Neo4jTransaction};

#[cfg(feature = "embedded")]
pub use embedded::{EmbeddedGraphStore, EmbeddedTransaction};

// Re-export core types
pub use memograph_core::traits::{
    GraphStore, GraphStoreConfig, GraphStoreConnector, GraphStoreProvider, GraphTransaction,
};
