/// Playlist song routes
use crate::{error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use encore_core::{PlaylistActivity, PlaylistId, PlaylistSong, SongId};
use encore_storage::playlists::DEFAULT_ACTIVITY_LIMIT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSongRequest {
    pub song_id: SongId,
}

#[derive(Debug, Deserialize)]
pub struct ReorderSongsRequest {
    pub order: Vec<SongId>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PositionResponse {
    pub position: i64,
}

/// GET /api/playlists/:id/songs
pub async fn list_songs(
    Path(playlist_id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<PlaylistSong>>> {
    let songs = app_state
        .membership
        .playlists()
        .list_songs(playlist_id, auth.user_id())
        .await?;
    Ok(Json(songs))
}

/// POST /api/playlists/:id/songs
/// Append a song to the end of the playlist
pub async fn add_song(
    Path(playlist_id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<AddSongRequest>,
) -> Result<(StatusCode, Json<PositionResponse>)> {
    let placement = app_state
        .membership
        .playlists()
        .add_song(playlist_id, req.song_id, auth.user_id())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PositionResponse {
            position: placement.position,
        }),
    ))
}

/// DELETE /api/playlists/:id/songs/:song_id
pub async fn remove_song(
    Path((playlist_id, song_id)): Path<(PlaylistId, SongId)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    app_state
        .membership
        .playlists()
        .remove_song(playlist_id, song_id, auth.user_id())
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// PATCH /api/playlists/:id/reorder
/// Replace the order with a permutation of the current songs
pub async fn reorder_songs(
    Path(playlist_id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<ReorderSongsRequest>,
) -> Result<Json<serde_json::Value>> {
    app_state
        .membership
        .playlists()
        .reorder(playlist_id, &req.order, auth.user_id())
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /api/playlists/:id/activity?limit=N
pub async fn activity(
    Path(playlist_id): Path<PlaylistId>,
    Query(query): Query<ActivityQuery>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<PlaylistActivity>>> {
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).clamp(1, 500);
    let entries = app_state
        .membership
        .playlists()
        .activity(playlist_id, auth.user_id(), limit)
        .await?;
    Ok(Json(entries))
}

/// DELETE /api/playlists/:id
pub async fn delete_playlist(
    Path(playlist_id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    app_state
        .membership
        .playlists()
        .delete_playlist(playlist_id, auth.user_id())
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
