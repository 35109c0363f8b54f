//! MCP server for the memograph knowledge graph.
//!
//! Exposes the [`KnowledgeGraphManager`](memograph_core::KnowledgeGraphManager)
//! operations as MCP tools over stdio.
//!
//! # Tools
//!
//! - `create_entities` - Create entities whose names are not taken yet
//! - `create_relations` - Create relations between existing entities
//! - `add_observations` - Attach new observations to existing entities
//! - `delete_entities` - Delete entities with their observations and relations
//! - `delete_observations` - Remove specific observations
//! - `delete_relations` - Remove specific relations
//! - `search_nodes` - Full-text and fuzzy search over entities
//! - `open_nodes` - Fetch entities by name
//!
//! # Configuration
//!
//! - `MEMOGRAPH_STORE` - `neo4j` (default) or `embedded`
//! - `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PASSWORD`, `NEO4J_DATABASE` - Neo4j connection
//! - `MEMOGRAPH_DB_PATH` - embedded database file (default: ~/.memograph/graph.db)
//! - `MEMOGRAPH_SEARCH_THRESHOLD` - fuzzy match cutoff (default: 0.4)
//! - `MEMOGRAPH_CONFIG` - TOML/JSON/YAML config file used instead of the variables above

pub mod server;
pub mod tools;

pub use server::KnowledgeGraphServer;
