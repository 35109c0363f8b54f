//! Core traits for memograph.

mod graph_store;

pub use graph_store::*;
