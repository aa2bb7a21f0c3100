//! Playlist activity log

use crate::error::{Result, StorageError};
use async_trait::async_trait;
use encore_core::{ActivityAction, ActivitySink, NewActivity, PlaylistActivity, PlaylistId};
use sqlx::{Row, SqlitePool};

pub async fn record(pool: &SqlitePool, activity: &NewActivity) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO playlist_activities (playlist_id, song_id, user_id, action, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(activity.playlist_id)
    .bind(activity.song_id)
    .bind(activity.user_id)
    .bind(activity.action.as_str())
    .bind(chrono::Utc::now().timestamp())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Most recent first
pub async fn list_for_playlist(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    limit: i64,
) -> Result<Vec<PlaylistActivity>> {
    let rows = sqlx::query(
        r#"
        SELECT id, playlist_id, song_id, user_id, action, created_at
        FROM playlist_activities
        WHERE playlist_id = ?
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(playlist_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let action: String = row.get("action");
            Ok(PlaylistActivity {
                id: row.get("id"),
                playlist_id: row.get("playlist_id"),
                song_id: row.get("song_id"),
                user_id: row.get("user_id"),
                action: ActivityAction::from_str(&action).ok_or_else(|| {
                    StorageError::corrupt("playlist_activities", format!("unknown action {action}"))
                })?,
                created_at: row.get("created_at"),
            })
        })
        .collect()
}

/// [`ActivitySink`] writing to `playlist_activities`
#[derive(Clone)]
pub struct SqlActivityLog {
    pool: SqlitePool,
}

impl SqlActivityLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivitySink for SqlActivityLog {
    async fn record(&self, activity: NewActivity) -> encore_core::Result<()> {
        record(&self.pool, &activity).await?;
        Ok(())
    }
}
