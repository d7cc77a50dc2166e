//! Two-phase upload client for the cache service

use crate::error::{Error, Result};
use crate::retry::{RetryConfig, retry_with_backoff};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

/// Everything one upload needs, constructed once and consumed once.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Base URL of the cache service API.
    pub api_base_url: String,
    /// Bearer token for the cache service.
    pub token: String,
    /// Location of the archive on disk.
    pub archive_path: PathBuf,
    /// Size of the archive in bytes, declared to the service up front.
    pub archive_size: u64,
    /// The evaluated cache key the archive is stored under.
    pub cache_key: String,
}

/// Body of the upload-location request.
#[derive(Debug, Serialize)]
struct PrepareUpload<'a> {
    cache_key: &'a str,
    archive_size_bytes: u64,
}

/// The service-issued destination for one archive.
///
/// Single-use by contract: never cached and never reused across keys, so it
/// stays private to the upload call that obtained it.
#[derive(Debug, Deserialize)]
struct UploadLocation {
    upload_url: String,
}

/// Client for the cache service's save endpoint.
///
/// The protocol is two-phase: an authenticated request for a (time-limited)
/// upload location, then a streamed transfer of the archive bytes to that
/// location. Each phase independently retries transient failures with
/// exponential backoff; the service remains the integrity authority and no
/// client-side re-verification happens after the transfer completes.
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    retry: RetryConfig,
}

impl UploadClient {
    /// Create a client with the default retry policy.
    pub fn new() -> Result<Self> {
        Self::with_retry_config(RetryConfig::default())
    }

    /// Create a client with an explicit retry policy.
    pub fn with_retry_config(retry: RetryConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, retry })
    }

    /// Upload the archive described by `request`.
    ///
    /// Validates credentials before any network I/O, then runs the two
    /// phases in order. Success means the transfer phase completed without
    /// error.
    pub async fn upload(&self, request: UploadRequest) -> Result<()> {
        if request.api_base_url.trim().is_empty() {
            return Err(Error::missing_credential("cache service URL"));
        }
        if request.token.trim().is_empty() {
            return Err(Error::missing_credential("cache service access token"));
        }

        let location = retry_with_backoff(&self.retry, "requesting upload location", || {
            self.request_location(&request)
        })
        .await?;

        retry_with_backoff(&self.retry, "transferring archive", || {
            self.transfer(&request, &location)
        })
        .await?;

        info!(cache_key = %request.cache_key, "archive upload confirmed");
        Ok(())
    }

    /// Phase one: ask the service where this archive should go.
    async fn request_location(&self, request: &UploadRequest) -> Result<UploadLocation> {
        let url = format!("{}/save", request.api_base_url.trim_end_matches('/'));
        debug!(%url, cache_key = %request.cache_key, "requesting upload location");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&request.token)
            .json(&PrepareUpload {
                cache_key: &request.cache_key,
                archive_size_bytes: request.archive_size,
            })
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;

        let response = check_status(response).await?;
        response
            .json::<UploadLocation>()
            .await
            .map_err(|e| Error::invalid_response(format!("upload location payload: {e}")))
    }

    /// Phase two: stream the archive bytes to the issued location.
    ///
    /// The file is re-opened per attempt so a retry always transfers from
    /// the start, and streamed so memory stays bounded regardless of
    /// archive size.
    async fn transfer(&self, request: &UploadRequest, location: &UploadLocation) -> Result<()> {
        debug!(
            size = request.archive_size,
            path = %request.archive_path.display(),
            "transferring archive"
        );

        let file = tokio::fs::File::open(&request.archive_path)
            .await
            .map_err(|e| Error::io(e, &request.archive_path, "open"))?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let response = self
            .http
            .put(&location.upload_url)
            .header(reqwest::header::CONTENT_LENGTH, request.archive_size)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;

        check_status(response).await.map(|_| ())
    }
}

/// Map an HTTP response onto the error taxonomy.
///
/// 401/403 are terminal authentication failures; 429 and 5xx stay
/// retryable service errors; any other non-success status is a terminal
/// service answer.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();
    if code == 401 || code == 403 {
        return Err(Error::Auth { status: code });
    }

    let message = response.text().await.unwrap_or_else(|_| status.to_string());
    Err(Error::Service {
        status: code,
        message,
    })
}
