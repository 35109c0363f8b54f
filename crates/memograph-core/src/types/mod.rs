//! Core types for memograph.

mod entity;
mod graph;
mod observation;
mod relation;
mod validation;

pub use entity::*;
pub use graph::*;
pub use observation::*;
pub use relation::*;
pub use validation::{dedup_preserving_order, is_valid_relation_type};
