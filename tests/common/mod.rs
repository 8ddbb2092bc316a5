// Scripted transport for tests: canned responses keyed by URL, no network.
//
// Records every request, counts calls per URL and tracks peak concurrency
// both globally and per URL, so queue invariants can be asserted directly.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use groupwatch::fetch::{FetchError, FetchResult, RawResponse, Request, Transport};
use serde_json::Value;

#[derive(Clone)]
enum Route {
    Respond {
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    },
    Fail(String),
}

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<Request>>,
    delay: Duration,
    active: AtomicUsize,
    peak: AtomicUsize,
    active_per_url: Mutex<HashMap<String, usize>>,
    peak_per_url: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every response takes `delay` to arrive, so concurrent callers overlap.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn respond(&self, url: &str, status: u16, headers: &[(&str, &str)], body: &[u8]) {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            Route::Respond {
                status,
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.to_vec(),
            },
        );
    }

    pub fn json(&self, url: &str, body: Value) {
        self.respond(url, 200, &[], body.to_string().as_bytes());
    }

    /// JSON array page with a `Link: <next>; rel="next"` header.
    pub fn json_with_next(&self, url: &str, body: Value, next: &str) {
        let link = format!(r#"<{next}>; rel="next""#);
        self.respond(url, 200, &[("Link", &link)], body.to_string().as_bytes());
    }

    pub fn text(&self, url: &str, body: &str) {
        self.respond(url, 200, &[], body.as_bytes());
    }

    pub fn status(&self, url: &str, status: u16) {
        self.respond(url, status, &[], b"");
    }

    pub fn fail(&self, url: &str, message: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Fail(message.to_string()));
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }

    /// Headers sent with the first request to `url`.
    pub fn headers_for(&self, url: &str) -> Option<Vec<(String, String)>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.url == url)
            .map(|r| r.headers.clone())
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn peak_per_url(&self) -> usize {
        self.peak_per_url.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> FetchResult<RawResponse> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        {
            let mut per_url = self.active_per_url.lock().unwrap();
            let count = per_url.entry(url.clone()).or_insert(0);
            *count += 1;
            self.peak_per_url.fetch_max(*count, Ordering::SeqCst);
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);
        if let Some(count) = self.active_per_url.lock().unwrap().get_mut(&url) {
            *count -= 1;
        }

        let route = self.routes.lock().unwrap().get(&url).cloned();
        match route {
            Some(Route::Respond {
                status,
                headers,
                body,
            }) => Ok(RawResponse::new(&url, status, headers, body)),
            Some(Route::Fail(message)) => Err(FetchError::Transport { url, message }),
            None => Ok(RawResponse::new(&url, 404, Vec::new(), Vec::new())),
        }
    }
}
