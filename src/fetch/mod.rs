// Fetch layer: every network call made during a run goes through here.
//
// The transport is the raw HTTP seam (reqwest in production, scripted in
// tests). The queue bounds and deduplicates in-flight requests, the fetcher
// decorates requests with credentials and checks statuses, and the
// paginator walks cursor-linked list endpoints on top of the fetcher.

pub mod error;
pub mod fetcher;
pub mod link;
pub mod paginate;
pub mod queue;
pub mod transport;

pub use error::{FetchError, FetchResult};
pub use fetcher::{Fetcher, ProtectedOrigin};
pub use paginate::{HalCollection, LinkHeader, PageCursor, Paginator};
pub use queue::{RequestKey, RequestQueue};
pub use transport::{HttpTransport, RawResponse, Request, Transport};
