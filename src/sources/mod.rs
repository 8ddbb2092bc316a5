// Source adapters: one per service kind, behind a common trait.
//
// An adapter turns a service address into normalized activity data. Adapters
// report failures as `FetchError`s; the registry is the boundary that turns
// those into inline placeholders so a broken service never fails the
// snapshot it belongs to.

pub mod feed;
pub mod mail;
pub mod repository;
pub mod wiki;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::fetch::{FetchError, FetchResult, Paginator};
use crate::model::{ActivityData, ActivityRecord, ServiceDescriptor, ServiceKind};

pub use feed::FeedAdapter;
pub use mail::MailingListAdapter;
pub use repository::RepositoryAdapter;
pub use wiki::WikiAdapter;

/// Produces activity data for one kind of service.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// The service kind this adapter handles.
    fn kind(&self) -> ServiceKind;

    /// Collect activity for the service at `link`.
    async fn collect(&self, link: &str) -> FetchResult<ActivityData>;
}

/// Fixed addresses and constants the standard adapters need.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub github_api_url: String,
    pub wiki_site_root: String,
    pub wiki_since: i64,
    pub archive_prefix: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            github_api_url: repository::DEFAULT_GITHUB_API_URL.to_string(),
            wiki_site_root: wiki::DEFAULT_SITE_ROOT.to_string(),
            wiki_since: wiki::DEFAULT_SINCE,
            archive_prefix: mail::DEFAULT_ARCHIVE_PREFIX.to_string(),
        }
    }
}

/// Kind → adapter lookup. Adding a source kind means registering one more adapter.
#[derive(Default)]
pub struct SourceRegistry {
    adapters: HashMap<ServiceKind, Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the feed, mailing-list, wiki and repository adapters.
    pub fn standard(pages: &Paginator, settings: &SourceSettings) -> Self {
        let feed = FeedAdapter::new(pages.fetcher().clone());

        let mut registry = Self::new();
        registry.register(Arc::new(feed.clone()));
        registry.register(Arc::new(MailingListAdapter::new(
            pages.fetcher().clone(),
            &settings.archive_prefix,
        )));
        registry.register(Arc::new(WikiAdapter::new(
            feed,
            &settings.wiki_site_root,
            settings.wiki_since,
        )));
        registry.register(Arc::new(RepositoryAdapter::new(
            pages.clone(),
            &settings.github_api_url,
        )));
        registry
    }

    /// Register `adapter` for its kind, replacing any previous one.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    pub fn supports(&self, kind: &ServiceKind) -> bool {
        self.adapters.contains_key(kind)
    }

    /// Collect activity for one service. Never fails: errors become placeholders.
    pub async fn activity(&self, service: &ServiceDescriptor) -> ActivityRecord {
        let data = match self.adapters.get(&service.kind) {
            Some(adapter) => match adapter.collect(&service.link).await {
                Ok(data) => data,
                Err(e @ FetchError::AddressShape { .. }) => {
                    warn!(kind = %service.kind, link = %service.link, "Unrecognized service address");
                    ActivityData::Skipped(capitalize(&e.to_string()))
                }
                Err(e) => {
                    warn!(kind = %service.kind, link = %service.link, error = %e, "Service fetch failed");
                    ActivityData::Error(format!("Error fetching {}: {e}", service.link))
                }
            },
            None => ActivityData::Skipped(format!("No adapter for service type {}", service.kind)),
        };

        ActivityRecord {
            service: service.clone(),
            data,
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
