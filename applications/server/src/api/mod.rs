/// API route modules
pub mod albums;
pub mod health;
pub mod playlists;
pub mod queue;
