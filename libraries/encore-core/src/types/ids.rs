//! Identifier types
//!
//! All entities live in one relational store and use integer row ids.

pub type UserId = i64;
pub type CreatorId = i64;
pub type SongId = i64;
pub type PodcastId = i64;
pub type PlaylistId = i64;
pub type AlbumId = i64;

/// Synthetic identity of a single membership row
pub type EntryId = i64;

/// Queue entries are addressed by their row identity because the same
/// song or podcast may be queued more than once
pub type QueueEntryId = EntryId;
