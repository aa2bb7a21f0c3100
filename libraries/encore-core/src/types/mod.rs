mod album;
mod ids;
mod membership;
mod playlist;
mod queue;
mod song;

pub use album::{Album, AlbumTrack};
pub use ids::{AlbumId, CreatorId, EntryId, PlaylistId, PodcastId, QueueEntryId, SongId, UserId};
pub use membership::{is_contiguous, MemberRef, MembershipRow, Placement, RelationKind};
pub use playlist::{ActivityAction, NewActivity, Playlist, PlaylistActivity, PlaylistSong};
pub use queue::{InsertMode, QueueEntry, QueueMember};
pub use song::Song;
