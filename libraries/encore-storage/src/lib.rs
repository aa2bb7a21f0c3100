//! Encore Storage
//!
//! `SQLite` persistence and the ordered-membership core for Encore.
//!
//! Three relations keep a dense 1-based ordering over a many-to-many link:
//! playlist songs, album tracks, and a user's play queue. They share one
//! implementation:
//!
//! - **Position Store** ([`positions`]): row access for one relation, no policy
//! - **Ordering Engine** ([`ordering`]): append, insert-at-head, remove with
//!   compaction, bulk reorder, all keeping positions `1..=N`
//! - **Coordinator** ([`coordinator`]): one transaction per engine call, under
//!   an exclusive per-container lock
//! - **Adapters** ([`playlists`], [`albums`], [`queue`]): existence and
//!   permission checks, then one engine call
//!
//! # Example
//!
//! ```rust,no_run
//! use encore_storage::{create_pool, run_migrations, MembershipContext, OrderingConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://encore.db").await?;
//! run_migrations(&pool).await?;
//!
//! let library = MembershipContext::new(pool, OrderingConfig::default());
//!
//! // User 1 appends song 7 to playlist 3
//! let placement = library.playlists().add_song(3, 7, 1).await?;
//! println!("song placed at {}", placement.position);
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

// The ordering core
pub mod coordinator;
pub mod ordering;
pub mod positions;

// Consumer adapters
pub mod albums;
pub mod playlists;
pub mod queue;

// Collaborators
pub mod activity;
pub mod catalog;

pub use activity::SqlActivityLog;
pub use albums::AlbumEditor;
pub use catalog::SqlCatalog;
pub use context::MembershipContext;
pub use coordinator::{ContainerScope, Coordinator, OrderingConfig};
pub use error::StorageError;
pub use ordering::OrderingEngine;
pub use playlists::PlaylistEditor;
pub use positions::{PositionStore, SqlPositionStore};
pub use queue::QueueEditor;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;
use std::time::Duration;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connection pool tuning
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    /// How long `SQLite` waits on a locked database before reporting busy
    pub busy_timeout: Duration,
    /// How long to wait for a free pooled connection
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            busy_timeout: Duration::from_secs(30),
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool with default tuning
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://encore.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    create_pool_with(database_url, &PoolConfig::default()).await
}

/// Create a new `SQLite` pool
///
/// # Errors
///
/// Returns an error if the URL is malformed or the connection fails
pub async fn create_pool_with(
    database_url: &str,
    config: &PoolConfig,
) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(database_url, "creating pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "database pool ready"
    );

    Ok(pool)
}
