//! Stats persistence.
//!
//! - [`StatsPersistence`]: raw load/save of the single stats record
//! - [`JsonFileStore`]: JSON file on disk (the default backend)
//! - [`MemoryStore`]: volatile backend for tests and throwaway runs
//! - [`StatsStore`]: serialized access to the record on top of a backend

mod json;
mod memory;
mod store;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{Snapshot, StatsStore};

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Stats;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Timed out after {0:?} waiting for the stats lock")]
    LockTimeout(Duration),

    #[error("Stats write did not complete: {0}")]
    Cancelled(String),
}

/// Backing storage for the stats record.
///
/// Implementations only move bytes; exclusivity is provided by [`StatsStore`].
#[async_trait]
pub trait StatsPersistence: Send + Sync {
    /// Read the stored record, `None` if nothing has been written yet.
    async fn load(&self) -> Result<Option<Stats>, StorageError>;

    /// Durably replace the stored record.
    async fn save(&self, stats: &Stats) -> Result<(), StorageError>;

    /// Short backend description for logs.
    fn describe(&self) -> String;
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn stats_path(&self) -> PathBuf {
        self.data_dir.join("stats.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
