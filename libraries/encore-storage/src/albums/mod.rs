//! Album track editing
//!
//! Only the album's creator edits its track list, and only with songs of
//! that same creator. A song sits on at most one album.

use crate::coordinator::Coordinator;
use crate::error::{Result as StorageResult, StorageError};
use crate::ordering::OrderingEngine;
use crate::positions::{AlbumTracks, SqlPositionStore};
use encore_core::{
    Album, AlbumId, AlbumTrack, ContainerAccess, EncoreError, MemberCatalog, MemberRef, Placement,
    RelationKind, Result, SongId, UserId,
};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Tracks with their titles, position ascending
pub async fn get_tracks(pool: &SqlitePool, album_id: AlbumId) -> StorageResult<Vec<AlbumTrack>> {
    let rows = sqlx::query(
        r#"
        SELECT t.song_id, t.position, t.added_at, s.title
        FROM album_tracks t
        LEFT JOIN songs s ON s.id = t.song_id
        WHERE t.album_id = ?
        ORDER BY t.position
        "#,
    )
    .bind(album_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| AlbumTrack {
            song_id: row.get("song_id"),
            position: row.get("position"),
            added_at: row.get("added_at"),
            title: row.get("title"),
        })
        .collect())
}

/// The album a song is placed on, if any
pub async fn album_of_song(pool: &SqlitePool, song_id: SongId) -> StorageResult<Option<AlbumId>> {
    let album_id = sqlx::query_scalar("SELECT album_id FROM album_tracks WHERE song_id = ?")
        .bind(song_id)
        .fetch_optional(pool)
        .await?;

    Ok(album_id)
}

pub struct AlbumEditor {
    engine: OrderingEngine<SqlPositionStore<AlbumTracks>>,
    catalog: Arc<dyn MemberCatalog>,
    access: Arc<dyn ContainerAccess>,
}

impl AlbumEditor {
    pub fn new(
        coordinator: Coordinator,
        catalog: Arc<dyn MemberCatalog>,
        access: Arc<dyn ContainerAccess>,
    ) -> Self {
        Self {
            engine: OrderingEngine::new(SqlPositionStore::new(), coordinator),
            catalog,
            access,
        }
    }

    pub fn engine(&self) -> &OrderingEngine<SqlPositionStore<AlbumTracks>> {
        &self.engine
    }

    /// Published albums are visible to everyone, drafts only to their creator
    pub async fn list_tracks(
        &self,
        album_id: AlbumId,
        user_id: UserId,
    ) -> Result<Vec<AlbumTrack>> {
        let album = self.find(album_id).await?;
        if !album.is_published && !self.access.can_edit_album(&album, user_id).await? {
            return Err(EncoreError::not_found("Album", album_id));
        }
        Ok(get_tracks(self.pool(), album_id).await?)
    }

    pub async fn add_track(
        &self,
        album_id: AlbumId,
        song_id: SongId,
        user_id: UserId,
    ) -> Result<Placement> {
        let album = self.editable(album_id, user_id).await?;
        self.check_song(&album, song_id).await?;

        let placement = self.engine.append(album_id, &song_id).await?;

        tracing::info!(
            album_id,
            song_id,
            position = placement.position,
            "track added to album"
        );
        Ok(placement)
    }

    /// Append several songs in request order, all or none
    pub async fn add_tracks(
        &self,
        album_id: AlbumId,
        song_ids: &[SongId],
        user_id: UserId,
    ) -> Result<Vec<Placement>> {
        let album = self.editable(album_id, user_id).await?;
        for &song_id in song_ids {
            self.check_song(&album, song_id).await?;
        }

        let placements = self.engine.append_many(album_id, song_ids).await?;

        tracing::info!(album_id, count = placements.len(), "tracks added to album");
        Ok(placements)
    }

    pub async fn remove_track(
        &self,
        album_id: AlbumId,
        song_id: SongId,
        user_id: UserId,
    ) -> Result<()> {
        self.editable(album_id, user_id).await?;
        self.engine
            .remove(album_id, &MemberRef::Member(song_id))
            .await?;

        tracing::info!(album_id, song_id, "track removed from album");
        Ok(())
    }

    pub async fn reorder(
        &self,
        album_id: AlbumId,
        order: &[SongId],
        user_id: UserId,
    ) -> Result<()> {
        self.editable(album_id, user_id).await?;
        self.engine.bulk_reorder(album_id, order).await
    }

    /// Delete the album and its track list; the songs themselves stay
    pub async fn delete_album(&self, album_id: AlbumId, user_id: UserId) -> Result<()> {
        self.editable(album_id, user_id).await?;

        let mut scope = self
            .engine
            .coordinator()
            .lock(RelationKind::AlbumTracks, album_id)
            .await?;
        let outcome = sqlx::query("DELETE FROM albums WHERE id = ?")
            .bind(album_id)
            .execute(scope.conn())
            .await
            .map(|_| ())
            .map_err(|e| EncoreError::from(StorageError::from(e)));
        scope.finish(outcome).await?;

        tracing::info!(album_id, user_id, "album deleted");
        Ok(())
    }

    fn pool(&self) -> &SqlitePool {
        self.engine.coordinator().pool()
    }

    async fn find(&self, album_id: AlbumId) -> Result<Album> {
        self.access
            .album(album_id)
            .await?
            .ok_or_else(|| EncoreError::not_found("Album", album_id))
    }

    async fn editable(&self, album_id: AlbumId, user_id: UserId) -> Result<Album> {
        let album = self.find(album_id).await?;
        if !self.access.can_edit_album(&album, user_id).await? {
            return Err(EncoreError::permission_denied(format!(
                "user {user_id} may not edit album {album_id}"
            )));
        }
        Ok(album)
    }

    async fn check_song(&self, album: &Album, song_id: SongId) -> Result<()> {
        let song = self
            .catalog
            .song(song_id)
            .await?
            .ok_or_else(|| EncoreError::not_found("Song", song_id))?;

        if song.creator_id != Some(album.creator_id) {
            return Err(EncoreError::permission_denied(format!(
                "song {song_id} belongs to another creator"
            )));
        }

        // Same-album repeats are caught under the lock by the engine
        if let Some(other) = album_of_song(self.pool(), song_id).await? {
            if other != album.id {
                return Err(EncoreError::duplicate_member(
                    format!("{} {}", RelationKind::AlbumTracks.container_entity(), other),
                    song_id,
                ));
            }
        }
        Ok(())
    }
}
