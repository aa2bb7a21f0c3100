//! Catalog lookups and container authorization backed by the local database

use crate::error::Result;
use async_trait::async_trait;
use encore_core::{
    Album, AlbumId, ContainerAccess, MemberCatalog, Playlist, PlaylistId, PodcastId, Song, SongId,
    UserId,
};
use sqlx::{Row, SqlitePool};

pub async fn get_song(pool: &SqlitePool, id: SongId) -> Result<Option<Song>> {
    let row = sqlx::query("SELECT id, title, creator_id FROM songs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| Song {
        id: row.get("id"),
        title: row.get("title"),
        creator_id: row.get("creator_id"),
    }))
}

pub async fn podcast_exists(pool: &SqlitePool, id: PodcastId) -> Result<bool> {
    let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM podcasts WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(exists != 0)
}

pub async fn user_exists(pool: &SqlitePool, id: UserId) -> Result<bool> {
    let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(exists != 0)
}

pub async fn get_playlist(pool: &SqlitePool, id: PlaylistId) -> Result<Option<Playlist>> {
    let row = sqlx::query(
        "SELECT id, owner_id, name, is_public, is_collaborative FROM playlists WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| Playlist {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        is_public: row.get::<i64, _>("is_public") != 0,
        is_collaborative: row.get::<i64, _>("is_collaborative") != 0,
    }))
}

/// Whether `user_id` is an ACCEPTED collaborator of the playlist
pub async fn is_accepted_collaborator(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    user_id: UserId,
) -> Result<bool> {
    let accepted: i64 = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM playlist_collaborators
            WHERE playlist_id = ? AND user_id = ? AND status = 'ACCEPTED'
        )
        "#,
    )
    .bind(playlist_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(accepted != 0)
}

pub async fn get_album(pool: &SqlitePool, id: AlbumId) -> Result<Option<Album>> {
    let row = sqlx::query("SELECT id, name, creator_id, is_published FROM albums WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| Album {
        id: row.get("id"),
        name: row.get("name"),
        creator_id: row.get("creator_id"),
        is_published: row.get::<i64, _>("is_published") != 0,
    }))
}

/// The user account behind a creator profile
pub async fn creator_user(pool: &SqlitePool, creator_id: i64) -> Result<Option<UserId>> {
    let user_id = sqlx::query_scalar("SELECT user_id FROM creators WHERE id = ?")
        .bind(creator_id)
        .fetch_optional(pool)
        .await?;

    Ok(user_id)
}

/// [`MemberCatalog`] and [`ContainerAccess`] over the local tables
#[derive(Clone)]
pub struct SqlCatalog {
    pool: SqlitePool,
}

impl SqlCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberCatalog for SqlCatalog {
    async fn song(&self, id: SongId) -> encore_core::Result<Option<Song>> {
        Ok(get_song(&self.pool, id).await?)
    }

    async fn podcast_exists(&self, id: PodcastId) -> encore_core::Result<bool> {
        Ok(podcast_exists(&self.pool, id).await?)
    }

    async fn user_exists(&self, id: UserId) -> encore_core::Result<bool> {
        Ok(user_exists(&self.pool, id).await?)
    }
}

#[async_trait]
impl ContainerAccess for SqlCatalog {
    async fn playlist(&self, id: PlaylistId) -> encore_core::Result<Option<Playlist>> {
        Ok(get_playlist(&self.pool, id).await?)
    }

    async fn can_view_playlist(
        &self,
        playlist: &Playlist,
        user_id: UserId,
    ) -> encore_core::Result<bool> {
        if playlist.is_public || playlist.owner_id == user_id {
            return Ok(true);
        }
        Ok(is_accepted_collaborator(&self.pool, playlist.id, user_id).await?)
    }

    async fn can_edit_playlist(
        &self,
        playlist: &Playlist,
        user_id: UserId,
    ) -> encore_core::Result<bool> {
        if playlist.owner_id == user_id {
            return Ok(true);
        }
        if !playlist.is_collaborative {
            return Ok(false);
        }
        Ok(is_accepted_collaborator(&self.pool, playlist.id, user_id).await?)
    }

    async fn album(&self, id: AlbumId) -> encore_core::Result<Option<Album>> {
        Ok(get_album(&self.pool, id).await?)
    }

    async fn can_edit_album(&self, album: &Album, user_id: UserId) -> encore_core::Result<bool> {
        let owner = creator_user(&self.pool, album.creator_id).await?;
        Ok(owner == Some(user_id))
    }
}
