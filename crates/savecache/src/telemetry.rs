//! Step timing telemetry.
//!
//! Emits structured events for the two expensive pipeline stages so the
//! surrounding platform can aggregate compression and upload performance.

use std::time::Duration;
use tracing::info;

/// Per-run telemetry context.
#[derive(Debug, Clone)]
pub struct Telemetry {
    path_count: usize,
}

impl Telemetry {
    /// Create a telemetry context for a run over `path_count` members.
    #[must_use]
    pub fn new(path_count: usize) -> Self {
        Self { path_count }
    }

    /// Record a finished compression stage.
    pub fn archive_compressed(&self, elapsed: Duration) {
        info!(
            target: "savecache::telemetry",
            event = "archive_compressed",
            compression_time_s = elapsed.as_secs(),
            path_count = self.path_count,
            "archive compressed"
        );
    }

    /// Record a finished upload stage.
    pub fn archive_uploaded(&self, elapsed: Duration, size_bytes: u64) {
        info!(
            target: "savecache::telemetry",
            event = "archive_uploaded",
            upload_time_s = elapsed.as_secs(),
            upload_size_bytes = size_bytes,
            "archive uploaded"
        );
    }
}
