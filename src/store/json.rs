// JsonFileStore: `<dir>/<group id>.json`, written to a temp file first and
// renamed into place so a crash never leaves a half-written snapshot.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::SnapshotStore;
use crate::model::Snapshot;

pub struct JsonFileStore {
    dir: PathBuf,
}

/// A snapshot file found on disk.
#[derive(Debug, Clone)]
pub struct StoredSnapshot {
    pub id: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: u64) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// List stored snapshots, sorted by group id. A missing directory is an empty store.
    pub fn list(&self) -> Result<Vec<StoredSnapshot>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read snapshot directory {}", self.dir.display()))?;

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };

            let metadata = std::fs::metadata(&path)
                .with_context(|| format!("Failed to stat {}", path.display()))?;
            snapshots.push(StoredSnapshot {
                id,
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                path,
            });
        }

        snapshots.sort_by(|a, b| {
            let numeric = |s: &StoredSnapshot| s.id.parse::<u64>().ok();
            numeric(a).cmp(&numeric(b)).then_with(|| a.id.cmp(&b.id))
        });
        Ok(snapshots)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create snapshot directory {}", self.dir.display()))?;

        let json = serde_json::to_vec_pretty(snapshot)
            .with_context(|| format!("Failed to serialize snapshot for group {}", snapshot.id))?;

        let target = self.path_for(snapshot.id);
        let temp = self.dir.join(format!("{}.json.tmp", snapshot.id));

        tokio::fs::write(&temp, &json)
            .await
            .with_context(|| format!("Failed to write {}", temp.display()))?;
        tokio::fs::rename(&temp, &target)
            .await
            .with_context(|| format!("Failed to move snapshot into place at {}", target.display()))?;

        debug!(group = snapshot.id, path = %target.display(), bytes = json.len(), "Saved snapshot");
        Ok(())
    }
}
