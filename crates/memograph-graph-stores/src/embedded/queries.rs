//! Row-level SQLite operations shared by the store and its transactions.

use std::collections::{HashMap, HashSet};

use rusqlite::{params, params_from_iter, Connection};

use memograph_core::error::MemographResult;
use memograph_core::types::{Entity, Relation};

/// `?1, ?2, ...` for an IN list of `count` values.
fn build_placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Turn free text into an FTS5 query: every whitespace-separated term is
/// quoted as a literal and the terms are OR-ed together.
pub fn sanitize_fts_query(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|term| term.trim_matches('"'))
        .filter(|term| !term.is_empty())
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

pub fn entity_names(conn: &Connection) -> MemographResult<HashSet<String>> {
    let mut stmt = conn.prepare_cached("SELECT name FROM entities")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<HashSet<String>, _>>()?;
    Ok(names)
}

pub fn entity_exists(conn: &Connection, name: &str) -> MemographResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM entities WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn insert_entity(conn: &Connection, entity: &Entity) -> MemographResult<()> {
    conn.execute(
        "INSERT INTO entities (name, entity_type) VALUES (?1, ?2)",
        params![entity.name, entity.entity_type],
    )?;
    insert_observations(conn, &entity.name, &entity.observations)
}

/// Observations and relations go with the entity through `ON DELETE CASCADE`.
pub fn delete_entities(conn: &Connection, names: &[String]) -> MemographResult<()> {
    let mut stmt = conn.prepare_cached("DELETE FROM entities WHERE name = ?1")?;
    for name in names {
        stmt.execute(params![name])?;
    }
    Ok(())
}

pub fn relation_triples(conn: &Connection) -> MemographResult<HashSet<Relation>> {
    let mut stmt =
        conn.prepare_cached("SELECT from_entity, to_entity, relation_type FROM relations")?;
    let triples = stmt
        .query_map([], |row| {
            Ok(Relation {
                from: row.get(0)?,
                to: row.get(1)?,
                relation_type: row.get(2)?,
            })
        })?
        .collect::<Result<HashSet<Relation>, _>>()?;
    Ok(triples)
}

pub fn insert_relation(conn: &Connection, relation: &Relation) -> MemographResult<()> {
    conn.execute(
        "INSERT INTO relations (from_entity, to_entity, relation_type) VALUES (?1, ?2, ?3)",
        params![relation.from, relation.to, relation.relation_type],
    )?;
    Ok(())
}

pub fn delete_relation(conn: &Connection, relation: &Relation) -> MemographResult<()> {
    conn.execute(
        "DELETE FROM relations WHERE from_entity = ?1 AND to_entity = ?2 AND relation_type = ?3",
        params![relation.from, relation.to, relation.relation_type],
    )?;
    Ok(())
}

pub fn observation_contents(conn: &Connection, entity_name: &str) -> MemographResult<HashSet<String>> {
    let mut stmt = conn.prepare_cached("SELECT content FROM observations WHERE entity_name = ?1")?;
    let contents = stmt
        .query_map(params![entity_name], |row| row.get(0))?
        .collect::<Result<HashSet<String>, _>>()?;
    Ok(contents)
}

pub fn insert_observations(
    conn: &Connection,
    entity_name: &str,
    contents: &[String],
) -> MemographResult<()> {
    let mut stmt =
        conn.prepare_cached("INSERT INTO observations (entity_name, content) VALUES (?1, ?2)")?;
    for content in contents {
        stmt.execute(params![entity_name, content])?;
    }
    Ok(())
}

pub fn delete_observations(
    conn: &Connection,
    entity_name: &str,
    contents: &[String],
) -> MemographResult<()> {
    let mut stmt = conn
        .prepare_cached("DELETE FROM observations WHERE entity_name = ?1 AND content = ?2")?;
    for content in contents {
        stmt.execute(params![entity_name, content])?;
    }
    Ok(())
}

/// Load entities with their observations, in creation order.
///
/// `names = None` loads every entity.
pub fn load_entities(conn: &Connection, names: Option<&[String]>) -> MemographResult<Vec<Entity>> {
    let (entity_sql, observation_sql) = match names {
        Some([]) => return Ok(Vec::new()),
        Some(names) => {
            let placeholders = build_placeholders(names.len());
            (
                format!(
                    "SELECT name, entity_type FROM entities WHERE name IN ({}) ORDER BY id",
                    placeholders
                ),
                format!(
                    "SELECT entity_name, content FROM observations WHERE entity_name IN ({}) ORDER BY id",
                    placeholders
                ),
            )
        }
        None => (
            "SELECT name, entity_type FROM entities ORDER BY id".to_string(),
            "SELECT entity_name, content FROM observations ORDER BY id".to_string(),
        ),
    };
    let bindings = names.unwrap_or_default();

    let mut stmt = conn.prepare(&entity_sql)?;
    let mut entities = stmt
        .query_map(params_from_iter(bindings.iter()), |row| {
            Ok(Entity::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<Entity>, _>>()?;

    let mut observations: HashMap<String, Vec<String>> = HashMap::new();
    let mut stmt = conn.prepare(&observation_sql)?;
    let rows = stmt.query_map(params_from_iter(bindings.iter()), |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    for row in rows {
        let (entity_name, content) = row?;
        observations.entry(entity_name).or_default().push(content);
    }

    for entity in &mut entities {
        if let Some(contents) = observations.remove(&entity.name) {
            entity.observations = contents;
        }
    }

    Ok(entities)
}

/// Relations with at least one endpoint in `names`.
pub fn relations_touching(conn: &Connection, names: &[String]) -> MemographResult<Vec<Relation>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = build_placeholders(names.len());
    let sql = format!(
        "SELECT from_entity, to_entity, relation_type FROM relations
         WHERE from_entity IN ({0}) OR to_entity IN ({0})
         ORDER BY id",
        placeholders
    );

    let mut stmt = conn.prepare(&sql)?;
    let relations = stmt
        .query_map(params_from_iter(names.iter()), |row| {
            Ok(Relation {
                from: row.get(0)?,
                to: row.get(1)?,
                relation_type: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<Relation>, _>>()?;
    Ok(relations)
}

/// Entity names whose name or type token-matches `query`, best rank first.
pub fn fulltext_search(conn: &Connection, query: &str) -> MemographResult<Vec<String>> {
    let Some(fts_query) = sanitize_fts_query(query) else {
        return Ok(Vec::new());
    };

    let mut stmt = conn.prepare_cached(
        "SELECT e.name FROM entities_fts
         JOIN entities e ON e.id = entities_fts.rowid
         WHERE entities_fts MATCH ?1
         ORDER BY rank",
    )?;
    let names = stmt
        .query_map(params![fts_query], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}
