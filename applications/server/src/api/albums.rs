/// Album track routes
use crate::{error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use encore_core::{AlbumId, AlbumTrack, SongId};
use serde::{Deserialize, Serialize};

use super::playlists::PositionResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTracksRequest {
    pub song_ids: Vec<SongId>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderTracksRequest {
    pub order: Vec<SongId>,
}

#[derive(Debug, Serialize)]
pub struct PositionsResponse {
    pub positions: Vec<i64>,
}

/// GET /api/albums/:id/songs
pub async fn list_tracks(
    Path(album_id): Path<AlbumId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<AlbumTrack>>> {
    let tracks = app_state
        .membership
        .albums()
        .list_tracks(album_id, auth.user_id())
        .await?;
    Ok(Json(tracks))
}

/// POST /api/albums/:id/songs/:song_id
pub async fn add_track(
    Path((album_id, song_id)): Path<(AlbumId, SongId)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<(StatusCode, Json<PositionResponse>)> {
    let placement = app_state
        .membership
        .albums()
        .add_track(album_id, song_id, auth.user_id())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PositionResponse {
            position: placement.position,
        }),
    ))
}

/// POST /api/albums/:id/songs
/// Append several tracks in request order; all or none
pub async fn add_tracks(
    Path(album_id): Path<AlbumId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<AddTracksRequest>,
) -> Result<(StatusCode, Json<PositionsResponse>)> {
    let placements = app_state
        .membership
        .albums()
        .add_tracks(album_id, &req.song_ids, auth.user_id())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PositionsResponse {
            positions: placements.iter().map(|p| p.position).collect(),
        }),
    ))
}

/// DELETE /api/albums/:id/songs/:song_id
pub async fn remove_track(
    Path((album_id, song_id)): Path<(AlbumId, SongId)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    app_state
        .membership
        .albums()
        .remove_track(album_id, song_id, auth.user_id())
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// PATCH /api/albums/:id/songs/reorder
pub async fn reorder_tracks(
    Path(album_id): Path<AlbumId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<ReorderTracksRequest>,
) -> Result<Json<serde_json::Value>> {
    app_state
        .membership
        .albums()
        .reorder(album_id, &req.order, auth.user_id())
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// DELETE /api/albums/:id
pub async fn delete_album(
    Path(album_id): Path<AlbumId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    app_state
        .membership
        .albums()
        .delete_album(album_id, auth.user_id())
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
