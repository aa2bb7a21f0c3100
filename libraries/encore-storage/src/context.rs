use crate::activity::SqlActivityLog;
use crate::albums::AlbumEditor;
use crate::catalog::SqlCatalog;
use crate::coordinator::{Coordinator, OrderingConfig};
use crate::playlists::PlaylistEditor;
use crate::queue::QueueEditor;
use encore_core::{ActivitySink, ContainerAccess, MemberCatalog};
use sqlx::SqlitePool;
use std::sync::Arc;

/// The three membership editors over one pool and one lock registry
pub struct MembershipContext {
    pool: SqlitePool,
    playlists: PlaylistEditor,
    albums: AlbumEditor,
    queue: QueueEditor,
}

impl MembershipContext {
    /// Editors backed by the local catalog and activity tables
    pub fn new(pool: SqlitePool, config: OrderingConfig) -> Self {
        let catalog = Arc::new(SqlCatalog::new(pool.clone()));
        let activity = Arc::new(SqlActivityLog::new(pool.clone()));
        Self::with_collaborators(pool, config, catalog.clone(), catalog, activity)
    }

    /// Editors with caller-supplied lookups, authorization and activity sink
    pub fn with_collaborators(
        pool: SqlitePool,
        config: OrderingConfig,
        catalog: Arc<dyn MemberCatalog>,
        access: Arc<dyn ContainerAccess>,
        activity: Arc<dyn ActivitySink>,
    ) -> Self {
        let coordinator = Coordinator::new(pool.clone(), config);

        Self {
            playlists: PlaylistEditor::new(
                coordinator.clone(),
                Arc::clone(&catalog),
                Arc::clone(&access),
                activity,
            ),
            albums: AlbumEditor::new(coordinator.clone(), Arc::clone(&catalog), access),
            queue: QueueEditor::new(coordinator, catalog),
            pool,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn playlists(&self) -> &PlaylistEditor {
        &self.playlists
    }

    pub fn albums(&self) -> &AlbumEditor {
        &self.albums
    }

    pub fn queue(&self) -> &QueueEditor {
        &self.queue
    }
}
