//! Cache service upload client
//!
//! Transfers a finished cache archive to the remote cache store. The
//! protocol is two-phase: an authenticated, credential-bearing request
//! for a single-use upload location, then a streamed byte transfer to that
//! location, with transient network failures retried per phase under a
//! bounded exponential backoff.
//!
//! Missing credentials fail fast before any network call. Authentication
//! failures and non-throttling client errors are terminal; exhausted
//! retries surface as an upload failure carrying the last observed error.

mod client;
mod error;
mod retry;

pub use client::{UploadClient, UploadRequest};
pub use error::{Error, Result};
pub use retry::{RetryConfig, retry_with_backoff};
