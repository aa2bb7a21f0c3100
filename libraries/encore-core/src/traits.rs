//! Capabilities the membership adapters consume
//!
//! These sit at the seam between the ordering core and the rest of the
//! platform. The storage crate ships SQL-backed implementations; tests and
//! other deployments may plug in their own.

use crate::error::Result;
use crate::types::{Album, AlbumId, NewActivity, Playlist, PlaylistId, PodcastId, Song, SongId, UserId};
use async_trait::async_trait;

/// Existence lookups for members within their owning domain
#[async_trait]
pub trait MemberCatalog: Send + Sync {
    /// Get a song by ID
    async fn song(&self, id: SongId) -> Result<Option<Song>>;

    /// Check whether a podcast exists
    async fn podcast_exists(&self, id: PodcastId) -> Result<bool>;

    /// Check whether a user exists; a play queue is keyed by its owner
    async fn user_exists(&self, id: UserId) -> Result<bool>;
}

/// Container lookups and authorization checks
#[async_trait]
pub trait ContainerAccess: Send + Sync {
    /// Get a playlist by ID
    async fn playlist(&self, id: PlaylistId) -> Result<Option<Playlist>>;

    /// Public playlists, the owner, and accepted collaborators may view
    async fn can_view_playlist(&self, playlist: &Playlist, user_id: UserId) -> Result<bool>;

    /// The owner, or accepted collaborators of a collaborative playlist, may edit
    async fn can_edit_playlist(&self, playlist: &Playlist, user_id: UserId) -> Result<bool>;

    /// Get an album by ID
    async fn album(&self, id: AlbumId) -> Result<Option<Album>>;

    /// Only the album's creator may edit it
    async fn can_edit_album(&self, album: &Album, user_id: UserId) -> Result<bool>;
}

/// Write side of the playlist activity log
///
/// Not transactionally coupled to membership edits: adapters call it after
/// a successful commit and only log a failure.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn record(&self, activity: NewActivity) -> Result<()>;
}
