//! Boundary validation helpers.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{MemographError, MemographResult};

/// Relation types become edge labels in the store, so they are restricted to
/// identifier characters.
static RELATION_TYPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{N}_]*$").expect("valid relation type regex"));

/// Whether `relation_type` is safe to use as an edge label.
pub fn is_valid_relation_type(relation_type: &str) -> bool {
    RELATION_TYPE_PATTERN.is_match(relation_type)
}

pub(crate) fn validate_label(value: &str, field: &str) -> MemographResult<()> {
    if value.trim().is_empty() {
        return Err(MemographError::validation(format!("{} cannot be empty", field)));
    }
    if value.chars().any(char::is_control) {
        return Err(MemographError::validation(format!(
            "{} contains control characters",
            field
        )));
    }
    Ok(())
}

/// Remove repeated strings, keeping the first occurrence of each.
pub fn dedup_preserving_order(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .iter()
        .filter(|value| seen.insert(value.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_type_pattern() {
        assert!(is_valid_relation_type("WORKS_FOR"));
        assert!(is_valid_relation_type("_internal"));
        assert!(is_valid_relation_type("knows2"));
        assert!(is_valid_relation_type("就职于"));
        assert!(!is_valid_relation_type(""));
        assert!(!is_valid_relation_type("2knows"));
        assert!(!is_valid_relation_type("works-for"));
        assert!(!is_valid_relation_type("WORKS`FOR"));
        assert!(!is_valid_relation_type("A]->(b"));
    }

    #[test]
    fn test_dedup_preserving_order() {
        let values = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(dedup_preserving_order(&values), vec!["b", "a"]);
    }
}
