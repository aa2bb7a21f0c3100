/// Play queue routes
///
/// The queue is always the caller's own; there is no user id in the path.
use crate::{error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use encore_core::{InsertMode, PodcastId, QueueEntry, QueueEntryId, QueueMember, SongId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueRequest {
    pub song_id: Option<SongId>,
    pub podcast_id: Option<PodcastId>,
    /// `NEXT` plays ahead of everything queued; anything else appends
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderQueueRequest {
    pub order: Vec<QueueEntryId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueResponse {
    pub queue_id: QueueEntryId,
    pub position: i64,
}

/// GET /api/queue
pub async fn list_queue(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<QueueEntry>>> {
    let entries = app_state.membership.queue().list(auth.user_id()).await?;
    Ok(Json(entries))
}

/// POST /api/queue
pub async fn enqueue(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<EnqueueRequest>,
) -> Result<(StatusCode, Json<EnqueueResponse>)> {
    let member = QueueMember::from_parts(req.song_id, req.podcast_id)?;
    let mode = InsertMode::parse(req.mode.as_deref());

    let placement = app_state
        .membership
        .queue()
        .enqueue(auth.user_id(), member, mode)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(EnqueueResponse {
            queue_id: placement.entry_id,
            position: placement.position,
        }),
    ))
}

/// DELETE /api/queue/:entry_id
pub async fn remove_entry(
    Path(entry_id): Path<QueueEntryId>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    app_state
        .membership
        .queue()
        .remove_entry(auth.user_id(), entry_id)
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// DELETE /api/queue
pub async fn clear_queue(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    let removed = app_state.membership.queue().clear(auth.user_id()).await?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}

/// PATCH /api/queue/reorder
/// Order is given as queue entry ids, since a member may be queued twice
pub async fn reorder_queue(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<ReorderQueueRequest>,
) -> Result<Json<serde_json::Value>> {
    app_state
        .membership
        .queue()
        .reorder(auth.user_id(), &req.order)
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
