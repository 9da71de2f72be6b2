//! Serialized access to the single stats record.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::{StatsPersistence, StorageError};
use crate::models::Stats;

/// A committed state of the record.
///
/// `revision` grows by one with every successful write during the life of
/// the process, so observers can tell an older snapshot from a newer one.
/// A snapshot loaded from the backend carries the latest revision issued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapshot {
    pub stats: Stats,
    pub revision: u64,
    pub committed_at: DateTime<Utc>,
}

/// Owner of the process-wide [`Stats`] aggregate.
///
/// Every read and every read-modify-write runs under one lock, and the
/// cached copy only changes after the backend confirmed the write.
/// Lock acquisition is bounded by `lock_timeout`; dropping the returned
/// future cancels the wait.
///
/// Backend I/O runs in a spawned task that owns the lock guard. A caller
/// that goes away mid-write does not stop the commit: the save and the
/// cache update finish together and only then is the lock released.
pub struct StatsStore {
    backend: Arc<dyn StatsPersistence>,
    current: Arc<Mutex<Option<Snapshot>>>,
    revision: Arc<AtomicU64>,
    lock_timeout: Duration,
}

type Slot = OwnedMutexGuard<Option<Snapshot>>;

impl StatsStore {
    pub fn new(backend: Arc<dyn StatsPersistence>, lock_timeout: Duration) -> Self {
        Self {
            backend,
            current: Arc::new(Mutex::new(None)),
            revision: Arc::new(AtomicU64::new(0)),
            lock_timeout,
        }
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Current stats. Initializes and persists a zeroed record when
    /// nothing is stored yet.
    pub async fn get(&self) -> Result<Stats, StorageError> {
        Ok(self.snapshot().await?.stats)
    }

    /// Current stats with their revision.
    pub async fn snapshot(&self) -> Result<Snapshot, StorageError> {
        let slot = self.lock().await?;
        let (_, snapshot) = self.load(slot).await?;
        Ok(snapshot)
    }

    /// Replace the whole record.
    pub async fn set(&self, stats: Stats) -> Result<Snapshot, StorageError> {
        let slot = self.lock().await?;
        self.commit(slot, stats).await
    }

    /// Read, transform and write back under a single lock hold.
    ///
    /// `f` receives the current stats and returns the replacement; an
    /// error from `f` aborts without writing anything.
    pub async fn update<F, E>(&self, f: F) -> Result<Snapshot, E>
    where
        F: FnOnce(&Stats) -> Result<Stats, E>,
        E: From<StorageError>,
    {
        let slot = self.lock().await?;
        let (slot, current) = self.load(slot).await?;
        let next = f(&current.stats)?;
        Ok(self.commit(slot, next).await?)
    }

    async fn lock(&self) -> Result<Slot, StorageError> {
        tokio::time::timeout(self.lock_timeout, self.current.clone().lock_owned())
            .await
            .map_err(|_| StorageError::LockTimeout(self.lock_timeout))
    }

    /// Cached snapshot, loading (and initializing) from the backend on
    /// first use.
    async fn load(&self, slot: Slot) -> Result<(Slot, Snapshot), StorageError> {
        if let Some(snapshot) = *slot {
            return Ok((slot, snapshot));
        }

        let backend = self.backend.clone();
        let revision = self.revision.clone();
        let task = tokio::spawn(async move {
            let mut slot = slot;
            let stats = match backend.load().await? {
                Some(stats) => stats,
                None => {
                    let empty = Stats::default();
                    backend.save(&empty).await?;
                    info!("Initialized empty stats in {}", backend.describe());
                    empty
                }
            };

            let snapshot = Snapshot {
                stats,
                revision: revision.load(Ordering::SeqCst),
                committed_at: Utc::now(),
            };
            *slot = Some(snapshot);
            Ok((slot, snapshot))
        });

        self.join(task).await
    }

    /// Save `stats` and, once the backend confirmed it, make it the cached
    /// snapshot.
    async fn commit(&self, slot: Slot, stats: Stats) -> Result<Snapshot, StorageError> {
        let backend = self.backend.clone();
        let revision = self.revision.clone();
        let task = tokio::spawn(async move {
            let mut slot = slot;
            if let Err(e) = backend.save(&stats).await {
                error!("Failed to persist stats to {}: {}", backend.describe(), e);
                return Err(e);
            }

            let snapshot = Snapshot {
                stats,
                revision: revision.fetch_add(1, Ordering::SeqCst) + 1,
                committed_at: Utc::now(),
            };
            *slot = Some(snapshot);
            debug!("Persisted stats revision {}: {:?}", snapshot.revision, stats);
            Ok(snapshot)
        });

        self.join(task).await
    }

    /// Wait for a backend task. A task that panicked or was aborted may have
    /// written the backend without updating the cache, so the cache is
    /// dropped and the next access reloads.
    async fn join<T>(
        &self,
        task: JoinHandle<Result<T, StorageError>>,
    ) -> Result<T, StorageError> {
        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!("Stats backend task did not complete: {}", e);
                *self.current.lock().await = None;
                Err(StorageError::Cancelled(e.to_string()))
            }
        }
    }
}
