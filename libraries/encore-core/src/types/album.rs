//! Album types

use super::ids::{AlbumId, CreatorId, SongId};
use serde::{Deserialize, Serialize};

/// An album owned by a creator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    pub creator_id: CreatorId,
    pub is_published: bool,
}

/// Track in an album with denormalized data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumTrack {
    pub song_id: SongId,
    pub position: i64,
    pub added_at: i64,

    /// Denormalized fields for display
    pub title: Option<String>,
}
