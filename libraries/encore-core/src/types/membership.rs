//! Ordered membership primitives shared by every container kind

use super::ids::EntryId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three ordered many-to-many relations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// playlist -> songs
    PlaylistSongs,
    /// album -> tracks
    AlbumTracks,
    /// user -> queued songs and podcasts
    PlayQueue,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::PlaylistSongs => "playlist_songs",
            RelationKind::AlbumTracks => "album_tracks",
            RelationKind::PlayQueue => "play_queue",
        }
    }

    /// Human-readable name of the owning container
    pub fn container_entity(&self) -> &'static str {
        match self {
            RelationKind::PlaylistSongs => "Playlist",
            RelationKind::AlbumTracks => "Album",
            RelationKind::PlayQueue => "Queue",
        }
    }

    /// Human-readable name of a member row
    pub fn member_entity(&self) -> &'static str {
        match self {
            RelationKind::PlaylistSongs => "Playlist song",
            RelationKind::AlbumTracks => "Album track",
            RelationKind::PlayQueue => "Queue entry",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One member placed in one container
///
/// For any container the positions of its rows are exactly `1..=N`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRow<M> {
    pub entry_id: EntryId,
    pub container_id: i64,
    pub member: M,
    pub position: i64,
    /// Unix timestamp (seconds)
    pub inserted_at: i64,
}

/// Where an inserted member landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub entry_id: EntryId,
    pub position: i64,
}

/// Addresses a row for removal: by member key in unique-membership
/// containers, by entry id where members may repeat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRef<M> {
    Member(M),
    Entry(EntryId),
}

/// Check that `rows` carry exactly the positions `1..=rows.len()`, each once
pub fn is_contiguous<M>(rows: &[MembershipRow<M>]) -> bool {
    let mut positions: Vec<i64> = rows.iter().map(|row| row.position).collect();
    positions.sort_unstable();
    positions
        .iter()
        .zip(1_i64..)
        .all(|(position, expected)| *position == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(positions: &[i64]) -> Vec<MembershipRow<i64>> {
        positions
            .iter()
            .enumerate()
            .map(|(i, &position)| MembershipRow {
                entry_id: i as i64 + 1,
                container_id: 1,
                member: i as i64 + 100,
                position,
                inserted_at: 0,
            })
            .collect()
    }

    #[test]
    fn contiguous_in_any_row_order() {
        assert!(is_contiguous::<i64>(&[]));
        assert!(is_contiguous(&rows(&[1, 2, 3])));
        assert!(is_contiguous(&rows(&[3, 1, 2])));
    }

    #[test]
    fn gaps_and_duplicates_are_not_contiguous() {
        assert!(!is_contiguous(&rows(&[1, 3])));
        assert!(!is_contiguous(&rows(&[1, 1, 2])));
        assert!(!is_contiguous(&rows(&[0, 1, 2])));
        assert!(!is_contiguous(&rows(&[2, 3, 4])));
    }

    #[test]
    fn relation_kind_names() {
        assert_eq!(RelationKind::AlbumTracks.to_string(), "album_tracks");
        assert_eq!(RelationKind::PlayQueue.container_entity(), "Queue");
    }
}
