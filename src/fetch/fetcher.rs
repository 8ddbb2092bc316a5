// Authenticated fetcher: credential injection on top of the request queue.
//
// Before a request is queued, its host is checked against a short list of
// protected origins. A match attaches that origin's credential header;
// anything else goes out bare. No retries and no state beyond the list.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::error::{FetchError, FetchResult};
use super::queue::RequestQueue;
use super::transport::{RawResponse, Request};

/// A host that receives a credential header on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedOrigin {
    host: String,
    header: String,
    value: String,
}

impl ProtectedOrigin {
    pub fn new(host: &str, header: &str, value: &str) -> Self {
        Self {
            host: host.to_ascii_lowercase(),
            header: header.to_string(),
            value: value.to_string(),
        }
    }

    /// Protect the host of `base_url` with the given header.
    pub fn for_base_url(base_url: &str, header: &str, value: &str) -> Result<Self> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("Invalid API base URL: {base_url}"))?;
        let host = parsed
            .host_str()
            .with_context(|| format!("API base URL has no host: {base_url}"))?;
        Ok(Self::new(host, header, value))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn matches(&self, url: &Url) -> bool {
        url.host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&self.host))
    }
}

/// Fetches addresses through the shared queue, attaching credentials for
/// protected origins and treating non-2xx statuses as failures.
#[derive(Clone)]
pub struct Fetcher {
    queue: RequestQueue,
    origins: Arc<[ProtectedOrigin]>,
}

impl Fetcher {
    pub fn new(queue: RequestQueue, origins: Vec<ProtectedOrigin>) -> Self {
        Self {
            queue,
            origins: origins.into(),
        }
    }

    /// Build the request for `url`, with a credential header if its host is protected.
    pub fn request_for(&self, url: &str) -> Request {
        let request = Request::get(url);
        let Ok(parsed) = Url::parse(url) else {
            return request;
        };

        match self.origins.iter().find(|origin| origin.matches(&parsed)) {
            Some(origin) => {
                debug!(url, host = origin.host(), "attaching credentials");
                request.with_header(&origin.header, &origin.value)
            }
            None => request,
        }
    }

    /// Fetch `url` and fail on anything but a 2xx status.
    pub async fn get(&self, url: &str) -> FetchResult<RawResponse> {
        let response = self.queue.enqueue(self.request_for(url)).await?;
        if !response.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }
        Ok(response)
    }

    pub async fn get_text(&self, url: &str) -> FetchResult<String> {
        Ok(self.get(url).await?.text())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        self.get(url).await?.json()
    }
}
