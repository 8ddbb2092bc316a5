// One monitoring pass over every open community group.
//
// For each group, three branches run concurrently: chairs, declared services
// (fanned out to the source adapters), and participations. Each branch
// catches its own failure and records a placeholder instead, so a broken
// branch never takes down its siblings or any other group. Only failing to
// list the groups in the first place aborts the run.
//
// All groups are processed at once; the request queue underneath is what
// bounds how much network work is actually in flight.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::directory::{DirectoryClient, Group};
use crate::fetch::{FetchResult, Fetcher, Paginator, RequestQueue, Transport};
use crate::model::{ActivityRecord, Fragment, Snapshot};
use crate::sources::SourceRegistry;
use crate::store::SnapshotStore;

/// Counts describing one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Groups of any type or state returned by the directory.
    pub groups_listed: usize,
    /// Open community groups, i.e. snapshots attempted.
    pub groups_monitored: usize,
    pub snapshots_saved: usize,
    pub snapshots_failed: usize,
    /// Saved or not, snapshots with at least one failed branch or service.
    pub snapshots_degraded: usize,
}

/// Holds everything a run needs: the directory client, the source adapters
/// and the snapshot store. Adapters and directory share one request queue.
pub struct Monitor {
    directory: DirectoryClient,
    sources: SourceRegistry,
    store: Arc<dyn SnapshotStore>,
}

impl Monitor {
    pub fn new(
        directory: DirectoryClient,
        sources: SourceRegistry,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            directory,
            sources,
            store,
        }
    }

    /// Wire up the queue, fetcher, paginator, directory and standard adapters from `config`.
    pub fn from_config(
        config: &Config,
        transport: Arc<dyn Transport>,
        store: Arc<dyn SnapshotStore>,
    ) -> Result<Self> {
        let queue = RequestQueue::new(transport, config.max_concurrent);
        let fetcher = Fetcher::new(queue, config.protected_origins()?);
        let pages = Paginator::new(fetcher, config.max_pages);

        let directory = DirectoryClient::new(pages.clone(), &config.directory_api_url);
        let sources = SourceRegistry::standard(&pages, &config.source_settings());

        Ok(Self::new(directory, sources, store))
    }

    /// Snapshot and persist every open community group.
    pub async fn run(&self) -> Result<RunSummary> {
        let groups = self
            .directory
            .groups()
            .await
            .context("Failed to fetch the community group list")?;

        let open: Vec<&Group> = groups
            .iter()
            .filter(|g| g.is_open_community_group())
            .collect();
        info!(listed = groups.len(), open = open.len(), "Community groups listed");

        let pb = ProgressBar::new(open.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("  Groups [{bar:30}] {pos}/{len} ({eta})")
        {
            pb.set_style(style);
        }

        let outcomes = join_all(open.iter().map(|group| {
            let pb = &pb;
            async move {
                let snapshot = self.snapshot_group(group).await;
                let degraded = snapshot.is_degraded();
                let saved = match self.store.save(&snapshot).await {
                    Ok(()) => true,
                    Err(e) => {
                        error!(group = group.id, error = %e, "Failed to save snapshot");
                        false
                    }
                };
                pb.inc(1);
                (saved, degraded)
            }
        }))
        .await;
        pb.finish_and_clear();

        let snapshots_saved = outcomes.iter().filter(|(saved, _)| *saved).count();
        let summary = RunSummary {
            groups_listed: groups.len(),
            groups_monitored: open.len(),
            snapshots_saved,
            snapshots_failed: outcomes.len() - snapshots_saved,
            snapshots_degraded: outcomes.iter().filter(|(_, degraded)| *degraded).count(),
        };

        info!(
            saved = summary.snapshots_saved,
            failed = summary.snapshots_failed,
            degraded = summary.snapshots_degraded,
            "Run complete"
        );
        Ok(summary)
    }

    /// Collect chairs, service activity and participations for one group.
    pub async fn snapshot_group(&self, group: &Group) -> Snapshot {
        let id = group.id;
        let (chairs, activities, participations) = tokio::join!(
            self.directory.chairs(id),
            self.service_activity(id),
            self.directory.participations(id),
        );

        Snapshot {
            id,
            group: group.clone(),
            chairs: capture(chairs, id, "chairs"),
            activities: capture(activities, id, "services"),
            participations: capture(participations, id, "participations"),
            fetched_at: Utc::now(),
        }
    }

    /// Fetch the declared services and fan the recognized ones out to their adapters.
    async fn service_activity(&self, id: u64) -> FetchResult<Vec<ActivityRecord>> {
        let services = self.directory.services(id).await?;
        let declared = services.len();

        let supported: Vec<_> = services
            .into_iter()
            .filter(|service| self.sources.supports(&service.kind))
            .collect();
        info!(
            group = id,
            declared,
            monitored = supported.len(),
            "Fetching service activity"
        );

        Ok(join_all(supported.iter().map(|service| self.sources.activity(service))).await)
    }
}

/// Keep a branch's value, or log its failure and keep a placeholder.
fn capture<T>(result: FetchResult<T>, group: u64, branch: &str) -> Fragment<T> {
    match result {
        Ok(value) => Fragment::Loaded(value),
        Err(e) => {
            warn!(group, branch, error = %e, "Snapshot branch failed");
            Fragment::Failed(format!("Error fetching {branch}: {e}"))
        }
    }
}
