use super::ids::{CreatorId, SongId};
use serde::{Deserialize, Serialize};

/// The slice of a song the membership adapters care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub creator_id: Option<CreatorId>,
}
