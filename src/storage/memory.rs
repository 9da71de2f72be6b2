//! In-memory backend.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{StatsPersistence, StorageError};
use crate::models::Stats;

/// Volatile stats backend. Can be told to fail writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<Stats>>,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing record.
    pub fn with_stats(stats: Stats) -> Self {
        Self {
            record: Mutex::new(Some(stats)),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Make every subsequent save fail with an I/O error until reset.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// What is currently "on disk".
    pub async fn stored(&self) -> Option<Stats> {
        *self.record.lock().await
    }
}

#[async_trait]
impl StatsPersistence for MemoryStore {
    async fn load(&self) -> Result<Option<Stats>, StorageError> {
        Ok(*self.record.lock().await)
    }

    async fn save(&self, stats: &Stats) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::Other,
                "memory store rejected write",
            )));
        }
        *self.record.lock().await = Some(*stats);
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
