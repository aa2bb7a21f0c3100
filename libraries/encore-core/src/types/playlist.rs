//! Playlist types

use super::ids::{PlaylistId, SongId, UserId};
use serde::{Deserialize, Serialize};

/// Playlist with collaboration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: PlaylistId,
    pub owner_id: UserId,
    pub name: String,
    pub is_public: bool,
    /// When false only the owner may edit, whatever the collaborator list says
    pub is_collaborative: bool,
}

/// Song in a playlist with denormalized data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSong {
    pub song_id: SongId,
    pub position: i64,
    pub added_at: i64,

    /// Denormalized fields for display
    pub title: Option<String>,
}

/// Kind of playlist edit recorded in the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityAction {
    Add,
    Remove,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Add => "ADD",
            ActivityAction::Remove => "REMOVE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ADD" => Some(ActivityAction::Add),
            "REMOVE" => Some(ActivityAction::Remove),
            _ => None,
        }
    }
}

/// Data for recording a playlist edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub playlist_id: PlaylistId,
    pub song_id: SongId,
    pub user_id: UserId,
    pub action: ActivityAction,
}

/// A recorded playlist edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistActivity {
    pub id: i64,
    pub playlist_id: PlaylistId,
    pub song_id: SongId,
    pub user_id: UserId,
    pub action: ActivityAction,
    pub created_at: i64,
}
