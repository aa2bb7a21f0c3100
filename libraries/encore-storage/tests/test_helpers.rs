//! Test helpers and fixtures for storage integration tests
//!
//! These helpers create test databases using REAL SQLite files (NOT in-memory)
//! so the unique position indexes, foreign keys and locking behave exactly
//! as in production.

#![allow(dead_code)]

use encore_core::types::*;
use encore_storage::{MembershipContext, OrderingConfig};
use sqlx::SqlitePool;
use std::time::Duration;
use tempfile::TempDir;

/// Test database wrapper that cleans up on drop
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let pool = encore_storage::create_pool(&db_url)
            .await
            .expect("Failed to create pool");

        encore_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            _temp_dir: temp_dir,
        }
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Editors with the default lock timeout
    pub fn context(&self) -> MembershipContext {
        MembershipContext::new(self.pool.clone(), OrderingConfig::default())
    }

    /// Editors that give up waiting for a container lock after `lock_timeout`
    pub fn context_with_timeout(&self, lock_timeout: Duration) -> MembershipContext {
        MembershipContext::new(self.pool.clone(), OrderingConfig { lock_timeout })
    }
}

/// Test fixture: Create a test user
pub async fn create_test_user(pool: &SqlitePool, username: &str) -> UserId {
    sqlx::query("INSERT INTO users (username) VALUES (?)")
        .bind(username)
        .execute(pool)
        .await
        .expect("Failed to create test user")
        .last_insert_rowid()
}

/// Test fixture: Create a creator profile for a user
pub async fn create_test_creator(pool: &SqlitePool, user_id: UserId, name: &str) -> CreatorId {
    sqlx::query("INSERT INTO creators (user_id, display_name) VALUES (?, ?)")
        .bind(user_id)
        .bind(name)
        .execute(pool)
        .await
        .expect("Failed to create test creator")
        .last_insert_rowid()
}

/// Test fixture: Create a song, optionally credited to a creator
pub async fn create_test_song(
    pool: &SqlitePool,
    title: &str,
    creator_id: Option<CreatorId>,
) -> SongId {
    sqlx::query("INSERT INTO songs (title, creator_id) VALUES (?, ?)")
        .bind(title)
        .bind(creator_id)
        .execute(pool)
        .await
        .expect("Failed to create test song")
        .last_insert_rowid()
}

/// Test fixture: Create several uncredited songs
pub async fn create_test_songs(pool: &SqlitePool, count: usize) -> Vec<SongId> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        ids.push(create_test_song(pool, &format!("Song {}", i + 1), None).await);
    }
    ids
}

/// Test fixture: Create a podcast
pub async fn create_test_podcast(pool: &SqlitePool, title: &str) -> PodcastId {
    sqlx::query("INSERT INTO podcasts (title) VALUES (?)")
        .bind(title)
        .execute(pool)
        .await
        .expect("Failed to create test podcast")
        .last_insert_rowid()
}

/// Test fixture: Create a private, non-collaborative playlist
pub async fn create_test_playlist(
    pool: &SqlitePool,
    name: &str,
    owner_id: UserId,
) -> PlaylistId {
    create_test_playlist_with(pool, name, owner_id, false, false).await
}

pub async fn create_test_playlist_with(
    pool: &SqlitePool,
    name: &str,
    owner_id: UserId,
    is_public: bool,
    is_collaborative: bool,
) -> PlaylistId {
    sqlx::query(
        "INSERT INTO playlists (owner_id, name, is_public, is_collaborative) VALUES (?, ?, ?, ?)",
    )
    .bind(owner_id)
    .bind(name)
    .bind(is_public)
    .bind(is_collaborative)
    .execute(pool)
    .await
    .expect("Failed to create test playlist")
    .last_insert_rowid()
}

/// Test fixture: Invite a collaborator with the given status
pub async fn add_test_collaborator(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    user_id: UserId,
    status: &str,
) {
    sqlx::query(
        "INSERT INTO playlist_collaborators (playlist_id, user_id, status) VALUES (?, ?, ?)",
    )
    .bind(playlist_id)
    .bind(user_id)
    .bind(status)
    .execute(pool)
    .await
    .expect("Failed to add test collaborator");
}

/// Test fixture: Create an album for a creator
pub async fn create_test_album(
    pool: &SqlitePool,
    name: &str,
    creator_id: CreatorId,
    is_published: bool,
) -> AlbumId {
    sqlx::query("INSERT INTO albums (creator_id, name, is_published) VALUES (?, ?, ?)")
        .bind(creator_id)
        .bind(name)
        .bind(is_published)
        .execute(pool)
        .await
        .expect("Failed to create test album")
        .last_insert_rowid()
}

/// `(song, position)` pairs of a playlist straight from the table
pub async fn playlist_positions(pool: &SqlitePool, playlist_id: PlaylistId) -> Vec<(i64, i64)> {
    raw_positions(
        pool,
        "SELECT song_id, position FROM playlist_songs WHERE playlist_id = ? ORDER BY position",
        playlist_id,
    )
    .await
}

/// `(song, position)` pairs of an album straight from the table
pub async fn album_positions(pool: &SqlitePool, album_id: AlbumId) -> Vec<(i64, i64)> {
    raw_positions(
        pool,
        "SELECT song_id, position FROM album_tracks WHERE album_id = ? ORDER BY position",
        album_id,
    )
    .await
}

/// `(entry, position)` pairs of a queue straight from the table
pub async fn queue_positions(pool: &SqlitePool, user_id: UserId) -> Vec<(i64, i64)> {
    raw_positions(
        pool,
        "SELECT id, position FROM play_queue WHERE user_id = ? ORDER BY position",
        user_id,
    )
    .await
}

async fn raw_positions(pool: &SqlitePool, sql: &str, container_id: i64) -> Vec<(i64, i64)> {
    sqlx::query_as(sql)
        .bind(container_id)
        .fetch_all(pool)
        .await
        .expect("Failed to read positions")
}

/// Assert positions are exactly 1..=N
pub fn assert_contiguous(pairs: &[(i64, i64)]) {
    let got: Vec<i64> = pairs.iter().map(|(_, position)| *position).collect();
    let expected: Vec<i64> = (1..=pairs.len() as i64).collect();
    assert_eq!(got, expected, "positions are not contiguous: {pairs:?}");
}
