//! Observation add and delete.

use futures::FutureExt;
use tracing::debug;

use super::KnowledgeGraphManager;
use crate::error::MemographResult;
use crate::types::{dedup_preserving_order, ObservationDeletion, ObservationInput};

impl KnowledgeGraphManager {
    /// Attach observations to existing entities.
    ///
    /// Missing entities are skipped. Each result entry holds only the contents
    /// that were not already present; entities with nothing new are omitted.
    pub async fn add_observations(
        &self,
        observations: Vec<ObservationInput>,
    ) -> MemographResult<Vec<ObservationInput>> {
        if observations.is_empty() {
            return Ok(Vec::new());
        }

        let store = self.store().await?;

        let added = self
            .with_transaction(store.as_ref(), "add_observations", move |tx| {
                async move {
                    let mut added = Vec::new();

                    for observation in observations {
                        if !tx.entity_exists(&observation.entity_name).await? {
                            debug!(
                                entity = %observation.entity_name,
                                "Skipping observations for missing entity"
                            );
                            continue;
                        }

                        let existing = tx.observation_contents(&observation.entity_name).await?;
                        let new_contents: Vec<String> =
                            dedup_preserving_order(&observation.contents)
                                .into_iter()
                                .filter(|content| !existing.contains(content))
                                .collect();

                        if new_contents.is_empty() {
                            continue;
                        }

                        tx.insert_observations(&observation.entity_name, &new_contents)
                            .await?;
                        added.push(ObservationInput {
                            entity_name: observation.entity_name,
                            contents: new_contents,
                        });
                    }

                    Ok(added)
                }
                .boxed()
            })
            .await?;

        self.refresh_mirror(store.as_ref()).await?;

        debug!(entities = added.len(), "Added observations");
        Ok(added)
    }

    /// Remove matching observation contents. Non-matching contents and
    /// missing entities are ignored.
    pub async fn delete_observations(
        &self,
        deletions: Vec<ObservationDeletion>,
    ) -> MemographResult<()> {
        if deletions.is_empty() {
            return Ok(());
        }

        let store = self.store().await?;

        self.with_transaction(store.as_ref(), "delete_observations", move |tx| {
            async move {
                for deletion in &deletions {
                    if deletion.contents.is_empty() {
                        continue;
                    }
                    tx.delete_observations(&deletion.entity_name, &deletion.contents)
                        .await?;
                }
                Ok(())
            }
            .boxed()
        })
        .await?;

        self.refresh_mirror(store.as_ref()).await?;
        Ok(())
    }
}
