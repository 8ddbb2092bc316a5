// Snapshot storage: backend-agnostic async interface.
//
// Implementors: JsonFileStore (one pretty-printed JSON file per group,
// written atomically) and MemoryStore (dry runs and tests). Each run
// overwrites a group's previous snapshot wholesale.

pub mod json;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::Snapshot;

pub use json::{JsonFileStore, StoredSnapshot};
pub use memory::MemoryStore;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist `snapshot`, replacing any earlier snapshot for the same group.
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;
}
