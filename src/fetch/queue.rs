// Bounded, deduplicating request queue.
//
// Every network call in a run funnels through one shared RequestQueue. It
// guarantees two things:
//   - at most `max_concurrent` transport calls are running at any instant
//   - at most one transport call per request key is outstanding; callers
//     that enqueue a key already waiting or running attach to that call
//     and receive a clone of its outcome
//
// State lives behind a std Mutex that is only held for table updates, never
// across an await. Each admitted request runs on its own spawned task so a
// call completes and fans out even if the caller that started it goes away.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tokio::sync::oneshot;
use tracing::{debug, error};

use super::error::{FetchError, FetchResult};
use super::transport::{RawResponse, Request, Transport};

/// Identity of a fetchable resource. Requests with equal keys are coalesced.
pub type RequestKey = String;

type Waiter = oneshot::Sender<FetchResult<RawResponse>>;

/// Shared handle to the queue. Cloning is cheap and all clones share one
/// in-flight table and one concurrency cap.
#[derive(Clone)]
pub struct RequestQueue {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    max_concurrent: usize,
    state: Mutex<QueueState>,
}

#[derive(Default)]
struct QueueState {
    /// Callers attached to each outstanding key, in attachment order.
    waiters: HashMap<RequestKey, Vec<Waiter>>,
    /// Admitted requests waiting for a free slot (FIFO).
    backlog: VecDeque<Request>,
    /// Transport calls currently running.
    in_flight: usize,
}

impl RequestQueue {
    /// Create a queue over `transport` allowing `max_concurrent` calls at once.
    ///
    /// A cap of zero is treated as one so the queue can always make progress.
    pub fn new(transport: Arc<dyn Transport>, max_concurrent: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                max_concurrent: max_concurrent.max(1),
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.inner.max_concurrent
    }

    /// Submit a request and wait for its outcome.
    ///
    /// If a request with the same key is already outstanding, no new
    /// transport call is made; this caller receives the same result as the
    /// one already in progress.
    pub async fn enqueue(&self, request: Request) -> FetchResult<RawResponse> {
        let key = request.url.clone();
        let (tx, rx) = oneshot::channel();

        let start = {
            let mut guard = self.inner.lock();
            let state = &mut *guard;
            match state.waiters.entry(key.clone()) {
                Entry::Occupied(mut attached) => {
                    attached.get_mut().push(tx);
                    debug!(url = %key, waiters = attached.get().len(), "joined outstanding request");
                    None
                }
                Entry::Vacant(slot) => {
                    slot.insert(vec![tx]);
                    if state.in_flight < self.inner.max_concurrent {
                        state.in_flight += 1;
                        Some(request)
                    } else {
                        debug!(url = %key, backlog = state.backlog.len() + 1, "queued request");
                        state.backlog.push_back(request);
                        None
                    }
                }
            }
        };

        if let Some(request) = start {
            Inner::start(Arc::clone(&self.inner), request);
        }

        rx.await.unwrap_or_else(|_| {
            Err(FetchError::transport(
                &key,
                "request task ended without delivering a result",
            ))
        })
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one request on its own task. The caller has already reserved a slot.
    fn start(inner: Arc<Inner>, request: Request) {
        tokio::spawn(async move {
            let key = request.url.clone();
            debug!(url = %key, "fetching");
            // A panicking transport must still answer its waiters and free its slot.
            let result = AssertUnwindSafe(inner.transport.send(request))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    error!(url = %key, "transport panicked");
                    Err(FetchError::transport(&key, "transport panicked"))
                });

            // Fan out, then hand the slot straight to the next backlog item
            // (or release it if the backlog is empty).
            let (waiters, next) = {
                let mut state = inner.lock();
                let waiters = state.waiters.remove(&key).unwrap_or_default();
                let next = state.backlog.pop_front();
                if next.is_none() {
                    state.in_flight -= 1;
                }
                (waiters, next)
            };

            for waiter in waiters {
                // A dropped receiver just means that caller stopped listening.
                let _ = waiter.send(result.clone());
            }

            if let Some(next) = next {
                Inner::start(Arc::clone(&inner), next);
            }
        });
    }
}
