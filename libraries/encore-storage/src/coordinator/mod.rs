//! Transaction / locking coordinator
//!
//! Every mutating ordering call runs inside a [`ContainerScope`]: an
//! exclusive per-container lock plus one open transaction, held until commit
//! or rollback.
//!
//! Two layers make up the lock:
//! - an in-process async mutex per `(relation, container)`, so calls on the
//!   same container queue up in acquisition order while calls on other
//!   containers never wait on it
//! - a write to the container's `container_locks` row as the first statement
//!   of the transaction, so the transaction owns the database write lock
//!   before it reads any position (the `SELECT ... FOR UPDATE` of `SQLite`)
//!
//! Both layers share one deadline. Dropping a scope without finishing it
//! (caller cancelled, deadline elapsed) rolls the transaction back and
//! releases the mutex.

use crate::error::StorageError;
use encore_core::{EncoreError, RelationKind, Result};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time::{timeout_at, Instant};

/// Registry size above which idle entries get pruned
const PRUNE_THRESHOLD: usize = 1024;

/// Engine-facing tuning
#[derive(Debug, Clone)]
pub struct OrderingConfig {
    /// How long a call waits for another call on the same container
    pub lock_timeout: Duration,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
        }
    }
}

type LockKey = (RelationKind, i64);

#[derive(Default)]
struct LockRegistry {
    locks: Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>,
}

impl LockRegistry {
    fn mutex_for(&self, key: LockKey) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

        if locks.len() > PRUNE_THRESHOLD {
            // Only the registry references an idle entry
            locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
        }

        Arc::clone(locks.entry(key).or_default())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Hands out [`ContainerScope`]s
///
/// Cheap to clone; clones share the lock registry.
#[derive(Clone)]
pub struct Coordinator {
    pool: SqlitePool,
    registry: Arc<LockRegistry>,
    config: OrderingConfig,
}

impl Coordinator {
    pub fn new(pool: SqlitePool, config: OrderingConfig) -> Self {
        Self {
            pool,
            registry: Arc::new(LockRegistry::default()),
            config,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Lock a container and open its transaction
    ///
    /// `lock_timeout` bounds the whole acquisition: the queue on the
    /// in-process mutex plus the wait for the database write lock, which
    /// another writer on the same database file may hold.
    ///
    /// # Errors
    ///
    /// `Concurrency` if the lock is not acquired within the configured
    /// timeout, `Storage` if the transaction cannot be opened.
    pub async fn lock(&self, kind: RelationKind, container_id: i64) -> Result<ContainerScope> {
        let deadline = Instant::now() + self.config.lock_timeout;
        let mutex = self.registry.mutex_for((kind, container_id));

        let guard = timeout_at(deadline, mutex.lock_owned())
            .await
            .map_err(|_| self.timed_out(kind, container_id, "container lock"))?;

        let tx = timeout_at(deadline, self.begin(kind, container_id))
            .await
            .map_err(|_| self.timed_out(kind, container_id, "database write lock"))??;

        tracing::trace!(relation = %kind, container_id, "container locked");

        Ok(ContainerScope {
            kind,
            container_id,
            tx,
            _guard: guard,
        })
    }

    /// Open the transaction and take the write lock with its first statement
    async fn begin(
        &self,
        kind: RelationKind,
        container_id: i64,
    ) -> Result<Transaction<'static, Sqlite>> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        sqlx::query(
            r#"
            INSERT INTO container_locks (relation, container_id)
            VALUES (?, ?)
            ON CONFLICT(relation, container_id) DO UPDATE SET container_id = excluded.container_id
            "#,
        )
        .bind(kind.as_str())
        .bind(container_id)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::from)?;

        Ok(tx)
    }

    fn timed_out(&self, kind: RelationKind, container_id: i64, waiting_for: &str) -> EncoreError {
        tracing::warn!(
            relation = %kind,
            container_id,
            timeout_ms = self.config.lock_timeout.as_millis() as u64,
            "timed out waiting for {}",
            waiting_for
        );
        EncoreError::Concurrency(format!(
            "timed out after {:?} waiting for {} {}",
            self.config.lock_timeout,
            kind.container_entity(),
            container_id
        ))
    }
}

/// Exclusive hold on one container's rows for the length of one transaction
pub struct ContainerScope {
    kind: RelationKind,
    container_id: i64,
    tx: Transaction<'static, Sqlite>,
    _guard: OwnedMutexGuard<()>,
}

impl ContainerScope {
    /// The open transaction
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Commit on `Ok`, roll back on `Err`; the lock is released either way
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, or the commit failure.
    pub async fn finish<T>(self, outcome: Result<T>) -> Result<T> {
        let Self {
            kind,
            container_id,
            tx,
            _guard,
        } = self;

        match outcome {
            Ok(value) => {
                tx.commit().await.map_err(StorageError::from)?;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(
                    relation = %kind,
                    container_id,
                    error = %err,
                    "rolling back membership change"
                );
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(
                        relation = %kind,
                        container_id,
                        error = %rollback_err,
                        "rollback failed"
                    );
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_container_shares_one_mutex() {
        let registry = LockRegistry::default();
        let a = registry.mutex_for((RelationKind::PlaylistSongs, 1));
        let b = registry.mutex_for((RelationKind::PlaylistSongs, 1));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn containers_and_relations_are_isolated() {
        let registry = LockRegistry::default();
        let playlist = registry.mutex_for((RelationKind::PlaylistSongs, 1));
        let other_playlist = registry.mutex_for((RelationKind::PlaylistSongs, 2));
        let album = registry.mutex_for((RelationKind::AlbumTracks, 1));

        assert!(!Arc::ptr_eq(&playlist, &other_playlist));
        assert!(!Arc::ptr_eq(&playlist, &album));

        let _held = playlist.try_lock().unwrap();
        assert!(other_playlist.try_lock().is_ok());
        assert!(album.try_lock().is_ok());
    }

    #[test]
    fn idle_entries_are_pruned() {
        let registry = LockRegistry::default();
        let held = registry.mutex_for((RelationKind::PlayQueue, 0));
        for id in 1..=PRUNE_THRESHOLD as i64 + 1 {
            registry.mutex_for((RelationKind::PlayQueue, id));
        }

        // This call crosses the threshold and prunes everything idle
        registry.mutex_for((RelationKind::PlayQueue, -1));
        assert_eq!(registry.len(), 2);
        assert!(Arc::ptr_eq(
            &held,
            &registry.mutex_for((RelationKind::PlayQueue, 0))
        ));
    }
}
