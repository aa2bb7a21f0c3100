//! Play queue types

use super::ids::{PodcastId, QueueEntryId, SongId};
use crate::error::{EncoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a queue entry plays: exactly one song or one podcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum QueueMember {
    Song(SongId),
    Podcast(PodcastId),
}

impl QueueMember {
    /// Build from the two optional ids a request or row carries
    pub fn from_parts(song_id: Option<SongId>, podcast_id: Option<PodcastId>) -> Result<Self> {
        match (song_id, podcast_id) {
            (Some(song), None) => Ok(QueueMember::Song(song)),
            (None, Some(podcast)) => Ok(QueueMember::Podcast(podcast)),
            _ => Err(EncoreError::validation(
                "exactly one of songId or podcastId must be given",
            )),
        }
    }

    pub fn song_id(&self) -> Option<SongId> {
        match self {
            QueueMember::Song(id) => Some(*id),
            QueueMember::Podcast(_) => None,
        }
    }

    pub fn podcast_id(&self) -> Option<PodcastId> {
        match self {
            QueueMember::Song(_) => None,
            QueueMember::Podcast(id) => Some(*id),
        }
    }
}

impl fmt::Display for QueueMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueMember::Song(id) => write!(f, "song:{}", id),
            QueueMember::Podcast(id) => write!(f, "podcast:{}", id),
        }
    }
}

/// Where an enqueued item goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InsertMode {
    /// After everything already queued
    #[default]
    End,
    /// Play next: ahead of everything already queued
    Next,
}

impl InsertMode {
    /// Lenient parse: anything but `next` (any case) means `End`
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(mode) if mode.trim().eq_ignore_ascii_case("next") => InsertMode::Next,
            _ => InsertMode::End,
        }
    }
}

/// A queued item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub queue_id: QueueEntryId,
    pub position: i64,
    pub member: QueueMember,
    pub added_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_requires_exactly_one_id() {
        assert_eq!(QueueMember::from_parts(Some(4), None).unwrap(), QueueMember::Song(4));
        assert_eq!(
            QueueMember::from_parts(None, Some(9)).unwrap(),
            QueueMember::Podcast(9)
        );
        assert!(QueueMember::from_parts(Some(4), Some(9)).is_err());
        assert!(QueueMember::from_parts(None, None).is_err());
    }

    #[test]
    fn member_serializes_as_tagged_union() {
        let json = serde_json::to_value(QueueMember::Podcast(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "podcast", "id": 3 }));
    }

    #[test]
    fn insert_mode_defaults_to_end() {
        assert_eq!(InsertMode::parse(None), InsertMode::End);
        assert_eq!(InsertMode::parse(Some("END")), InsertMode::End);
        assert_eq!(InsertMode::parse(Some("sideways")), InsertMode::End);
        assert_eq!(InsertMode::parse(Some("next")), InsertMode::Next);
        assert_eq!(InsertMode::parse(Some("NEXT")), InsertMode::Next);
    }
}
