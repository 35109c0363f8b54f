//! Entity creation and deletion.

use futures::FutureExt;
use tracing::debug;

use super::KnowledgeGraphManager;
use crate::error::MemographResult;
use crate::types::Entity;

impl KnowledgeGraphManager {
    /// Create the entities whose names are not taken yet.
    ///
    /// Returns exactly the newly created entities, with repeated observation
    /// contents collapsed. Candidates whose name already exists (in the store
    /// or earlier in the same batch) are skipped, not reported as errors.
    pub async fn create_entities(&self, entities: Vec<Entity>) -> MemographResult<Vec<Entity>> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }
        for entity in &entities {
            entity.validate()?;
        }

        let requested = entities.len();
        let store = self.store().await?;

        let created = self
            .with_transaction(store.as_ref(), "create_entities", move |tx| {
                async move {
                    let mut existing = tx.entity_names().await?;
                    let mut created = Vec::new();

                    for entity in entities {
                        if !existing.insert(entity.name.clone()) {
                            continue;
                        }
                        let entity = entity.normalized();
                        tx.insert_entity(&entity).await?;
                        created.push(entity);
                    }

                    Ok(created)
                }
                .boxed()
            })
            .await?;

        self.refresh_mirror(store.as_ref()).await?;

        debug!(requested, created = created.len(), "Created entities");
        Ok(created)
    }

    /// Delete entities together with their observations and every relation
    /// touching them. Unknown names are ignored.
    pub async fn delete_entities(&self, names: Vec<String>) -> MemographResult<()> {
        if names.is_empty() {
            return Ok(());
        }

        let requested = names.len();
        let store = self.store().await?;

        self.with_transaction(store.as_ref(), "delete_entities", move |tx| {
            async move { tx.delete_entities(&names).await }.boxed()
        })
        .await?;

        self.refresh_mirror(store.as_ref()).await?;

        debug!(requested, "Deleted entities");
        Ok(())
    }
}
