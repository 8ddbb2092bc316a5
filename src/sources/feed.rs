// RSS/Atom feed adapter.
//
// Parses with feed-rs and keeps a stable, serializable summary of the feed
// and its entries. Entry contents are not interpreted further.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::SourceAdapter;
use crate::fetch::{FetchError, FetchResult, Fetcher};
use crate::model::{ActivityData, ServiceKind};

/// A parsed feed, reduced to the fields worth keeping in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedActivity {
    pub title: Option<String>,
    pub link: Option<String>,
    pub updated: Option<DateTime<Utc>>,
    pub entries: Vec<FeedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub id: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl From<feed_rs::model::Feed> for FeedActivity {
    fn from(feed: feed_rs::model::Feed) -> Self {
        Self {
            title: feed.title.map(|t| t.content),
            link: feed.links.into_iter().next().map(|l| l.href),
            updated: feed.updated,
            entries: feed
                .entries
                .into_iter()
                .map(|entry| FeedEntry {
                    id: entry.id,
                    title: entry.title.map(|t| t.content),
                    link: entry.links.into_iter().next().map(|l| l.href),
                    published: entry.published,
                    updated: entry.updated,
                })
                .collect(),
        }
    }
}

/// Parse a feed body into a `FeedActivity`.
pub fn parse_feed(url: &str, body: &[u8]) -> FetchResult<FeedActivity> {
    let feed = feed_rs::parser::parse(body).map_err(|e| FetchError::decode(url, e))?;
    Ok(feed.into())
}

#[derive(Clone)]
pub struct FeedAdapter {
    fetcher: Fetcher,
}

impl FeedAdapter {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    pub async fn fetch_feed(&self, url: &str) -> FetchResult<FeedActivity> {
        let response = self.fetcher.get(url).await?;
        let feed = parse_feed(url, response.body())?;
        debug!(url, entries = feed.entries.len(), "Parsed feed");
        Ok(feed)
    }
}

#[async_trait]
impl SourceAdapter for FeedAdapter {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Feed
    }

    async fn collect(&self, link: &str) -> FetchResult<ActivityData> {
        Ok(ActivityData::Feed(self.fetch_feed(link).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Group blog</title>
    <link>https://example.org/blog</link>
    <description>News</description>
    <item>
      <title>First post</title>
      <link>https://example.org/blog/1</link>
      <guid>post-1</guid>
      <pubDate>Mon, 01 Jan 2024 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Second post</title>
      <link>https://example.org/blog/2</link>
      <guid>post-2</guid>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_rss_into_summary() {
        let feed = parse_feed("https://example.org/feed", RSS.as_bytes()).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Group blog"));
        assert_eq!(feed.entries.len(), 2);
        assert_eq!(feed.entries[0].title.as_deref(), Some("First post"));
        assert_eq!(feed.entries[0].link.as_deref(), Some("https://example.org/blog/1"));
        assert!(feed.entries[0].published.is_some());
        assert!(feed.entries[1].published.is_none());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = parse_feed("https://example.org/feed", b"<html>not a feed</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }
}
