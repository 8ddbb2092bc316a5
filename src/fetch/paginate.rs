// Pagination walker: follows next-page cursors across a list endpoint and
// flattens every page's items into one Vec, in cursor order.
//
// The walk is a loop with a hard page cap rather than recursion. An upstream
// that never stops returning a next cursor gets cut off at `max_pages` with
// a warning and the items collected so far.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{FetchError, FetchResult};
use super::fetcher::Fetcher;
use super::link::next_link;
use super::transport::RawResponse;

/// Default upper bound on pages fetched by a single walk.
pub const DEFAULT_MAX_PAGES: usize = 200;

/// How a paginated API lays out its items and points at the next page.
pub trait PageCursor: Send + Sync {
    /// Extract the JSON array of items from a decoded page body.
    fn items(&self, body: Value, url: &str) -> FetchResult<Value>;

    /// Address of the next page, or `None` on the last page.
    fn next_page(&self, response: &RawResponse, body: &Value) -> Option<String>;
}

/// Body is a bare JSON array; the next page comes from a `Link: <...>; rel="next"` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkHeader;

impl PageCursor for LinkHeader {
    fn items(&self, body: Value, url: &str) -> FetchResult<Value> {
        match body {
            Value::Array(_) => Ok(body),
            other => Err(FetchError::decode(
                url,
                format!("expected a JSON array, got {}", json_kind(&other)),
            )),
        }
    }

    fn next_page(&self, response: &RawResponse, _body: &Value) -> Option<String> {
        response.header("link").and_then(next_link)
    }
}

/// HAL-style body: items under `_embedded.<collection>`, next page at `_links.next.href`.
#[derive(Debug, Clone)]
pub struct HalCollection {
    collection: String,
}

impl HalCollection {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
        }
    }
}

impl PageCursor for HalCollection {
    fn items(&self, mut body: Value, url: &str) -> FetchResult<Value> {
        if !body.is_object() {
            return Err(FetchError::decode(
                url,
                format!("expected a JSON object, got {}", json_kind(&body)),
            ));
        }
        // An empty collection may omit `_embedded` entirely.
        Ok(body
            .pointer_mut(&format!("/_embedded/{}", self.collection))
            .map(Value::take)
            .unwrap_or_else(|| Value::Array(Vec::new())))
    }

    fn next_page(&self, _response: &RawResponse, body: &Value) -> Option<String> {
        body.pointer("/_links/next/href")
            .and_then(Value::as_str)
            .filter(|href| !href.is_empty())
            .map(str::to_string)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Walks paginated endpoints through a `Fetcher`.
#[derive(Clone)]
pub struct Paginator {
    fetcher: Fetcher,
    max_pages: usize,
}

impl Paginator {
    pub fn new(fetcher: Fetcher, max_pages: usize) -> Self {
        Self {
            fetcher,
            max_pages: max_pages.max(1),
        }
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Fetch `start` and every page after it, returning all items in page order.
    ///
    /// Any page failing to fetch or decode fails the whole walk. A missing
    /// or malformed next cursor ends the walk normally.
    pub async fn walk<T: DeserializeOwned>(
        &self,
        start: &str,
        cursor: &impl PageCursor,
    ) -> FetchResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(start.to_string());
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            if pages == self.max_pages {
                warn!(
                    start,
                    url = %url,
                    max_pages = self.max_pages,
                    "Pagination cutoff reached, ignoring remaining pages"
                );
                break;
            }

            let response = self.fetcher.get(&url).await?;
            let body: Value = response.json()?;
            next = cursor.next_page(&response, &body);

            let page: Vec<T> = serde_json::from_value(cursor.items(body, &url)?)
                .map_err(|e| FetchError::decode(&url, e))?;
            pages += 1;

            debug!(url = %url, page = pages, items = page.len(), "Fetched page");
            items.extend(page);
        }

        Ok(items)
    }
}
