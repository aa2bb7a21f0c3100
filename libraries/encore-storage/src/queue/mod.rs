//! Play queue editing
//!
//! Each user owns exactly one queue, keyed by their user id. The same song
//! or podcast may be queued several times, so entries are addressed by
//! their queue entry id.

use crate::coordinator::Coordinator;
use crate::ordering::OrderingEngine;
use crate::positions::{PlayQueue, SqlPositionStore};
use encore_core::{
    EncoreError, InsertMode, MemberCatalog, MemberRef, Placement, QueueEntry, QueueEntryId,
    QueueMember, Result, UserId,
};
use std::sync::Arc;

pub struct QueueEditor {
    engine: OrderingEngine<SqlPositionStore<PlayQueue>>,
    catalog: Arc<dyn MemberCatalog>,
}

impl QueueEditor {
    pub fn new(coordinator: Coordinator, catalog: Arc<dyn MemberCatalog>) -> Self {
        Self {
            engine: OrderingEngine::new(SqlPositionStore::new(), coordinator),
            catalog,
        }
    }

    pub fn engine(&self) -> &OrderingEngine<SqlPositionStore<PlayQueue>> {
        &self.engine
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<QueueEntry>> {
        let rows = self.engine.list(user_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| QueueEntry {
                queue_id: row.entry_id,
                position: row.position,
                member: row.member,
                added_at: row.inserted_at,
            })
            .collect())
    }

    /// Queue a song or podcast at the end, or next in line
    pub async fn enqueue(
        &self,
        user_id: UserId,
        member: QueueMember,
        mode: InsertMode,
    ) -> Result<Placement> {
        if !self.catalog.user_exists(user_id).await? {
            return Err(EncoreError::not_found("User", user_id));
        }

        let exists = match member {
            QueueMember::Song(id) => self.catalog.song(id).await?.is_some(),
            QueueMember::Podcast(id) => self.catalog.podcast_exists(id).await?,
        };
        if !exists {
            let (entity, id) = match member {
                QueueMember::Song(id) => ("Song", id),
                QueueMember::Podcast(id) => ("Podcast", id),
            };
            return Err(EncoreError::not_found(entity, id));
        }

        let placement = match mode {
            InsertMode::End => self.engine.append(user_id, &member).await?,
            InsertMode::Next => self.engine.insert_at_head(user_id, &member).await?,
        };

        tracing::info!(
            user_id,
            member = %member,
            ?mode,
            position = placement.position,
            "queued"
        );
        Ok(placement)
    }

    /// Remove one entry from the caller's own queue
    ///
    /// An entry in someone else's queue reports `NotFound`.
    pub async fn remove_entry(&self, user_id: UserId, entry_id: QueueEntryId) -> Result<()> {
        self.engine
            .remove(user_id, &MemberRef::Entry(entry_id))
            .await?;
        Ok(())
    }

    /// Empty the queue; returns how many entries went
    pub async fn clear(&self, user_id: UserId) -> Result<u64> {
        let removed = self.engine.clear(user_id).await?;
        tracing::info!(user_id, removed, "queue cleared");
        Ok(removed)
    }

    pub async fn reorder(&self, user_id: UserId, order: &[QueueEntryId]) -> Result<()> {
        self.engine.bulk_reorder_entries(user_id, order).await
    }
}
