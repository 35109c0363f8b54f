//! SQLite schema for the embedded graph store.
//!
//! Three tables mirror the property-graph model:
//! - `entities`: nodes, unique by name
//! - `observations`: child records owned by one entity, unique per entity
//! - `relations`: edges, unique by `(from_entity, to_entity, relation_type)`
//!
//! Deleting an entity cascades to its observations and incident relations.
//! `entities_fts` is the full-text index over name and type.

use rusqlite::Connection;

use memograph_core::error::MemographResult;

/// SQL statements for creating the graph schema.
pub const CREATE_ENTITIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS entities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    entity_type TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
"#;

/// Index for efficient entity lookups by type.
pub const CREATE_ENTITIES_TYPE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_entities_type ON entities(entity_type)
"#;

/// SQL for observations table.
pub const CREATE_OBSERVATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS observations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_name TEXT NOT NULL REFERENCES entities(name) ON DELETE CASCADE,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(entity_name, content)
)
"#;

/// SQL for relations table.
pub const CREATE_RELATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS relations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_entity TEXT NOT NULL REFERENCES entities(name) ON DELETE CASCADE,
    to_entity TEXT NOT NULL REFERENCES entities(name) ON DELETE CASCADE,
    relation_type TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(from_entity, to_entity, relation_type)
)
"#;

/// Index for traversal to target (source is covered by the unique index).
pub const CREATE_RELATIONS_TARGET_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_relations_target ON relations(to_entity)
"#;

/// Full-text index over entity name and type.
pub const CREATE_ENTITIES_FTS_TABLE: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS entities_fts USING fts5(
    name, entity_type,
    content='entities', content_rowid='id'
)
"#;

/// Keep the full-text index in step with inserts.
pub const CREATE_ENTITIES_FTS_INSERT_TRIGGER: &str = r#"
CREATE TRIGGER IF NOT EXISTS entities_fts_insert AFTER INSERT ON entities BEGIN
    INSERT INTO entities_fts(rowid, name, entity_type)
    VALUES (new.id, new.name, new.entity_type);
END
"#;

/// Keep the full-text index in step with deletes.
pub const CREATE_ENTITIES_FTS_DELETE_TRIGGER: &str = r#"
CREATE TRIGGER IF NOT EXISTS entities_fts_delete AFTER DELETE ON entities BEGIN
    INSERT INTO entities_fts(entities_fts, rowid, name, entity_type)
    VALUES ('delete', old.id, old.name, old.entity_type);
END
"#;

/// Initialize the graph schema in the given database connection.
///
/// Creates all tables, indexes and triggers if they don't exist.
/// Safe to call multiple times (idempotent).
pub fn init_schema(conn: &Connection) -> MemographResult<()> {
    // Cascades depend on this
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    // Create tables
    conn.execute(CREATE_ENTITIES_TABLE, [])?;
    conn.execute(CREATE_OBSERVATIONS_TABLE, [])?;
    conn.execute(CREATE_RELATIONS_TABLE, [])?;

    // Create indexes
    conn.execute(CREATE_ENTITIES_TYPE_INDEX, [])?;
    conn.execute(CREATE_RELATIONS_TARGET_INDEX, [])?;

    // Full-text index
    conn.execute(CREATE_ENTITIES_FTS_TABLE, [])?;
    conn.execute(CREATE_ENTITIES_FTS_INSERT_TRIGGER, [])?;
    conn.execute(CREATE_ENTITIES_FTS_DELETE_TRIGGER, [])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert!(tables.contains(&"entities".to_string()));
        assert!(tables.contains(&"observations".to_string()));
        assert!(tables.contains(&"relations".to_string()));
        assert!(tables.contains(&"entities_fts".to_string()));
    }

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
    }

    #[test]
    fn test_entity_name_unique() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO entities (name, entity_type) VALUES ('John', 'Person')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO entities (name, entity_type) VALUES ('John', 'Robot')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_observation_unique_per_entity() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        conn.execute_batch(
            "INSERT INTO entities (name, entity_type) VALUES ('John', 'Person');
             INSERT INTO entities (name, entity_type) VALUES ('Jane', 'Person');
             INSERT INTO observations (entity_name, content) VALUES ('John', 'likes coding');
             INSERT INTO observations (entity_name, content) VALUES ('Jane', 'likes coding');",
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO observations (entity_name, content) VALUES ('John', 'likes coding')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_entity_delete_cascades() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        conn.execute_batch(
            "INSERT INTO entities (name, entity_type) VALUES ('John', 'Person');
             INSERT INTO entities (name, entity_type) VALUES ('Acme', 'Company');
             INSERT INTO observations (entity_name, content) VALUES ('Acme', 'makes widgets');
             INSERT INTO relations (from_entity, to_entity, relation_type) VALUES ('John', 'Acme', 'WORKS_FOR');",
        )
        .unwrap();

        conn.execute("DELETE FROM entities WHERE name = 'Acme'", [])
            .unwrap();

        let observations: i64 = conn
            .query_row("SELECT COUNT(*) FROM observations", [], |row| row.get(0))
            .unwrap();
        let relations: i64 = conn
            .query_row("SELECT COUNT(*) FROM relations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(observations, 0);
        assert_eq!(relations, 0);
    }

    #[test]
    fn test_fulltext_index_follows_entities() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO entities (name, entity_type) VALUES ('Acme', 'Company')",
            [],
        )
        .unwrap();

        let hits: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM entities_fts WHERE entities_fts MATCH '\"company\"'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(hits, 1);

        conn.execute("DELETE FROM entities WHERE name = 'Acme'", [])
            .unwrap();
        let hits: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM entities_fts WHERE entities_fts MATCH '\"company\"'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(hits, 0);
    }
}
