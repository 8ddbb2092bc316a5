// Wiki adapter: reads a MediaWiki recent-changes feed through the feed adapter.

use async_trait::async_trait;

use super::feed::FeedAdapter;
use super::SourceAdapter;
use crate::fetch::FetchResult;
use crate::model::{ActivityData, ServiceKind};

/// Root that relative wiki addresses are resolved against.
pub const DEFAULT_SITE_ROOT: &str = "https://www.w3.org";

/// Changes are requested from this point on (2018-01-01T00:00:00+01:00).
pub const DEFAULT_SINCE: i64 = 1_514_761_200;

/// Address of the recent-changes feed for the wiki at `link`.
pub fn changes_feed_url(site_root: &str, link: &str, since: i64) -> String {
    let base = if link.starts_with("http") {
        link.to_string()
    } else {
        let root = site_root.trim_end_matches('/');
        match link.strip_prefix('/') {
            Some(path) => format!("{root}/{path}"),
            None => format!("{root}/{link}"),
        }
    };

    format!(
        "{}/api.php?action=feedrecentchanges&from={since}",
        base.trim_end_matches('/')
    )
}

pub struct WikiAdapter {
    feed: FeedAdapter,
    site_root: String,
    since: i64,
}

impl WikiAdapter {
    pub fn new(feed: FeedAdapter, site_root: &str, since: i64) -> Self {
        Self {
            feed,
            site_root: site_root.to_string(),
            since,
        }
    }
}

#[async_trait]
impl SourceAdapter for WikiAdapter {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Wiki
    }

    async fn collect(&self, link: &str) -> FetchResult<ActivityData> {
        let url = changes_feed_url(&self.site_root, link, self.since);
        Ok(ActivityData::Feed(self.feed.fetch_feed(&url).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_against_site_root() {
        assert_eq!(
            changes_feed_url("https://www.w3.org", "/community/webed/wiki", 1_514_761_200),
            "https://www.w3.org/community/webed/wiki/api.php?action=feedrecentchanges&from=1514761200"
        );
        assert_eq!(
            changes_feed_url("https://www.w3.org/", "community/webed/wiki/", 42),
            "https://www.w3.org/community/webed/wiki/api.php?action=feedrecentchanges&from=42"
        );
    }

    #[test]
    fn absolute_addresses_are_kept() {
        assert_eq!(
            changes_feed_url("https://www.w3.org", "https://wiki.example.org/w", 10),
            "https://wiki.example.org/w/api.php?action=feedrecentchanges&from=10"
        );
    }
}
