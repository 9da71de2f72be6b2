//! JSON file backend.
//!
//! The whole record is one JSON object. Writes go to a sibling temp file
//! that is flushed to disk and then renamed over the target.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{StatsPersistence, StorageConfig, StorageError};
use crate::models::Stats;

/// Stats stored as a single JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at `<data_dir>/stats.json`.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.stats_path())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl StatsPersistence for JsonFileStore {
    async fn load(&self) -> Result<Option<Stats>, StorageError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(None);
        }

        let stats: Stats = serde_json::from_str(&contents)?;
        debug!("Loaded stats from {:?}", self.path);
        Ok(Some(stats))
    }

    async fn save(&self, stats: &Stats) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(stats)?;
        let temp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, &self.path).await?;

        debug!("Wrote stats to {:?}", self.path);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}
