//! Encore Server Library
//!
//! HTTP surface over the ordered-membership engine: playlist songs, album
//! tracks and the play queue, behind bearer-token authentication.
//!
//! This library exposes the router and its parts for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod router;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use router::create_router;
pub use services::auth::AuthService;
pub use state::AppState;
