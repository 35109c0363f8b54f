//! Relation creation and deletion.
//!
//! Relations are not part of the search mirror, so neither operation rebuilds it.

use futures::FutureExt;
use tracing::debug;

use super::KnowledgeGraphManager;
use crate::error::MemographResult;
use crate::types::{is_valid_relation_type, Relation};

impl KnowledgeGraphManager {
    /// Create the relations whose endpoints both exist and whose
    /// `(from, to, relation_type)` triple is not stored yet.
    ///
    /// Returns exactly the created relations.
    pub async fn create_relations(
        &self,
        relations: Vec<Relation>,
    ) -> MemographResult<Vec<Relation>> {
        if relations.is_empty() {
            return Ok(Vec::new());
        }
        for relation in &relations {
            relation.validate()?;
        }

        let requested = relations.len();
        let store = self.store().await?;

        let created = self
            .with_transaction(store.as_ref(), "create_relations", move |tx| {
                async move {
                    let names = tx.entity_names().await?;
                    let mut existing = tx.relation_triples().await?;
                    let mut created = Vec::new();

                    for relation in relations {
                        if !names.contains(&relation.from) || !names.contains(&relation.to) {
                            debug!(
                                from = %relation.from,
                                to = %relation.to,
                                "Skipping relation with missing endpoint"
                            );
                            continue;
                        }
                        if !existing.insert(relation.clone()) {
                            continue;
                        }
                        tx.insert_relation(&relation).await?;
                        created.push(relation);
                    }

                    Ok(created)
                }
                .boxed()
            })
            .await?;

        debug!(requested, created = created.len(), "Created relations");
        Ok(created)
    }

    /// Delete the edges matching the given triples. Triples with no match,
    /// including ones whose type could never have been stored, are ignored.
    pub async fn delete_relations(&self, relations: Vec<Relation>) -> MemographResult<()> {
        let relations: Vec<Relation> = relations
            .into_iter()
            .filter(|relation| {
                let valid = is_valid_relation_type(&relation.relation_type);
                if !valid {
                    debug!(
                        relation_type = %relation.relation_type,
                        "Ignoring deletion of relation with invalid type"
                    );
                }
                valid
            })
            .collect();

        if relations.is_empty() {
            return Ok(());
        }

        let requested = relations.len();
        let store = self.store().await?;

        self.with_transaction(store.as_ref(), "delete_relations", move |tx| {
            async move {
                for relation in &relations {
                    tx.delete_relation(relation).await?;
                }
                Ok(())
            }
            .boxed()
        })
        .await?;

        debug!(requested, "Deleted relations");
        Ok(())
    }
}
