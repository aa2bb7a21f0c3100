//! Encore Core
//!
//! Platform-agnostic core types, traits, and error handling for Encore.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: playlists, albums, queue entries and the generic
//!   [`MembershipRow`] that every ordered relation is made of
//! - **Collaborator Traits**: [`MemberCatalog`], [`ContainerAccess`] and
//!   [`ActivitySink`], the capabilities the membership adapters consume
//! - **Error Handling**: Unified [`EncoreError`] and [`Result`] types
//!
//! # Example
//!
//! ```rust
//! use encore_core::types::{MembershipRow, QueueMember, RelationKind};
//!
//! let row = MembershipRow {
//!     entry_id: 7,
//!     container_id: 1,
//!     member: QueueMember::Podcast(3),
//!     position: 1,
//!     inserted_at: 0,
//! };
//!
//! assert_eq!(RelationKind::PlayQueue.as_str(), "play_queue");
//! assert_eq!(row.member.to_string(), "podcast:3");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{EncoreError, Result};
pub use traits::{ActivitySink, ContainerAccess, MemberCatalog};

pub use types::{
    is_contiguous, ActivityAction, Album, AlbumId, AlbumTrack, CreatorId, EntryId, InsertMode,
    MemberRef, MembershipRow, NewActivity, Placement, Playlist, PlaylistActivity, PlaylistId,
    PlaylistSong, PodcastId, QueueEntry, QueueEntryId, QueueMember, RelationKind, Song, SongId,
    UserId,
};
