//! Playlist editing
//!
//! Existence and permission checks, then one ordering call on the
//! playlist's songs. Successful adds and removals are reported to the
//! activity sink after commit.

use crate::activity;
use crate::coordinator::Coordinator;
use crate::error::{Result as StorageResult, StorageError};
use crate::ordering::OrderingEngine;
use crate::positions::{PlaylistSongs, SqlPositionStore};
use encore_core::{
    ActivityAction, ActivitySink, ContainerAccess, EncoreError, MemberCatalog, MemberRef,
    NewActivity, Placement, Playlist, PlaylistActivity, PlaylistId, PlaylistSong, RelationKind,
    Result, SongId, UserId,
};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Default page size for the activity log
pub const DEFAULT_ACTIVITY_LIMIT: i64 = 50;

/// Songs with their titles, position ascending
pub async fn get_songs(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
) -> StorageResult<Vec<PlaylistSong>> {
    let rows = sqlx::query(
        r#"
        SELECT ps.song_id, ps.position, ps.added_at, s.title
        FROM playlist_songs ps
        LEFT JOIN songs s ON s.id = ps.song_id
        WHERE ps.playlist_id = ?
        ORDER BY ps.position
        "#,
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| PlaylistSong {
            song_id: row.get("song_id"),
            position: row.get("position"),
            added_at: row.get("added_at"),
            title: row.get("title"),
        })
        .collect())
}

pub struct PlaylistEditor {
    engine: OrderingEngine<SqlPositionStore<PlaylistSongs>>,
    catalog: Arc<dyn MemberCatalog>,
    access: Arc<dyn ContainerAccess>,
    activity: Arc<dyn ActivitySink>,
}

impl PlaylistEditor {
    pub fn new(
        coordinator: Coordinator,
        catalog: Arc<dyn MemberCatalog>,
        access: Arc<dyn ContainerAccess>,
        activity: Arc<dyn ActivitySink>,
    ) -> Self {
        Self {
            engine: OrderingEngine::new(SqlPositionStore::new(), coordinator),
            catalog,
            access,
            activity,
        }
    }

    pub fn engine(&self) -> &OrderingEngine<SqlPositionStore<PlaylistSongs>> {
        &self.engine
    }

    pub async fn list_songs(
        &self,
        playlist_id: PlaylistId,
        user_id: UserId,
    ) -> Result<Vec<PlaylistSong>> {
        self.viewable(playlist_id, user_id).await?;
        Ok(get_songs(self.engine.coordinator().pool(), playlist_id).await?)
    }

    /// Append a song to the end of the playlist
    pub async fn add_song(
        &self,
        playlist_id: PlaylistId,
        song_id: SongId,
        user_id: UserId,
    ) -> Result<Placement> {
        self.editable(playlist_id, user_id).await?;
        if self.catalog.song(song_id).await?.is_none() {
            return Err(EncoreError::not_found("Song", song_id));
        }

        let placement = self.engine.append(playlist_id, &song_id).await?;
        self.note(playlist_id, song_id, user_id, ActivityAction::Add).await;

        tracing::info!(
            playlist_id,
            song_id,
            user_id,
            position = placement.position,
            "song added to playlist"
        );
        Ok(placement)
    }

    pub async fn remove_song(
        &self,
        playlist_id: PlaylistId,
        song_id: SongId,
        user_id: UserId,
    ) -> Result<()> {
        self.editable(playlist_id, user_id).await?;

        self.engine
            .remove(playlist_id, &MemberRef::Member(song_id))
            .await?;
        self.note(playlist_id, song_id, user_id, ActivityAction::Remove).await;

        tracing::info!(playlist_id, song_id, user_id, "song removed from playlist");
        Ok(())
    }

    /// Replace the playlist order with `order`, a permutation of its songs
    pub async fn reorder(
        &self,
        playlist_id: PlaylistId,
        order: &[SongId],
        user_id: UserId,
    ) -> Result<()> {
        self.editable(playlist_id, user_id).await?;
        self.engine.bulk_reorder(playlist_id, order).await
    }

    pub async fn activity(
        &self,
        playlist_id: PlaylistId,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<PlaylistActivity>> {
        self.viewable(playlist_id, user_id).await?;
        Ok(activity::list_for_playlist(self.engine.coordinator().pool(), playlist_id, limit).await?)
    }

    /// Delete the playlist with its songs and activity; owner only
    pub async fn delete_playlist(&self, playlist_id: PlaylistId, user_id: UserId) -> Result<()> {
        let playlist = self.find(playlist_id).await?;
        if playlist.owner_id != user_id {
            return Err(EncoreError::permission_denied(
                "only the owner may delete a playlist",
            ));
        }

        let mut scope = self
            .engine
            .coordinator()
            .lock(RelationKind::PlaylistSongs, playlist_id)
            .await?;
        let outcome = sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(playlist_id)
            .execute(scope.conn())
            .await
            .map(|_| ())
            .map_err(|e| EncoreError::from(StorageError::from(e)));
        scope.finish(outcome).await?;

        tracing::info!(playlist_id, user_id, "playlist deleted");
        Ok(())
    }

    async fn find(&self, playlist_id: PlaylistId) -> Result<Playlist> {
        self.access
            .playlist(playlist_id)
            .await?
            .ok_or_else(|| EncoreError::not_found("Playlist", playlist_id))
    }

    async fn viewable(&self, playlist_id: PlaylistId, user_id: UserId) -> Result<Playlist> {
        let playlist = self.find(playlist_id).await?;
        if !self.access.can_view_playlist(&playlist, user_id).await? {
            // Private playlists are indistinguishable from missing ones
            return Err(EncoreError::not_found("Playlist", playlist_id));
        }
        Ok(playlist)
    }

    async fn editable(&self, playlist_id: PlaylistId, user_id: UserId) -> Result<Playlist> {
        let playlist = self.find(playlist_id).await?;
        if !self.access.can_edit_playlist(&playlist, user_id).await? {
            return Err(EncoreError::permission_denied(format!(
                "user {user_id} may not edit playlist {playlist_id}"
            )));
        }
        Ok(playlist)
    }

    async fn note(
        &self,
        playlist_id: PlaylistId,
        song_id: SongId,
        user_id: UserId,
        action: ActivityAction,
    ) {
        let activity = NewActivity {
            playlist_id,
            song_id,
            user_id,
            action,
        };
        if let Err(e) = self.activity.record(activity).await {
            tracing::warn!(playlist_id, song_id, error = %e, "failed to record playlist activity");
        }
    }
}
