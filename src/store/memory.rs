// MemoryStore: keeps snapshots in memory. Used by `run --dry-run` and tests.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::SnapshotStore;
use crate::model::Snapshot;

#[derive(Default)]
pub struct MemoryStore {
    snapshots: Mutex<BTreeMap<u64, Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: u64) -> Option<Snapshot> {
        self.snapshots.lock().await.get(&id).cloned()
    }

    /// Every stored snapshot, ordered by group id.
    pub async fn all(&self) -> Vec<Snapshot> {
        self.snapshots.lock().await.values().cloned().collect()
    }

    pub async fn ids(&self) -> Vec<u64> {
        self.snapshots.lock().await.keys().copied().collect()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.lock().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.snapshots
            .lock()
            .await
            .insert(snapshot.id, snapshot.clone());
        Ok(())
    }
}
