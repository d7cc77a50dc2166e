//! Error types for the upload client

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for upload operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A required credential is missing from the configuration
    #[error("Missing cache service credential: {name}")]
    #[diagnostic(
        code(savecache::network::missing_credential),
        help("Set the cache service URL and access token before running the save step")
    )]
    MissingCredential {
        /// Which credential is missing
        name: &'static str,
    },

    /// The cache service rejected the credentials
    #[error("Cache service authentication failed (HTTP {status})")]
    #[diagnostic(
        code(savecache::network::auth),
        help("The access token is missing, expired or not valid for this cache")
    )]
    Auth {
        /// The HTTP status the service answered with
        status: u16,
    },

    /// The cache service answered with an error status
    #[error("Cache service error (HTTP {status}): {message}")]
    #[diagnostic(code(savecache::network::service))]
    Service {
        /// The HTTP status the service answered with
        status: u16,
        /// Response body or status text
        message: String,
    },

    /// The request never produced an HTTP response
    #[error("Network error: {message}")]
    #[diagnostic(code(savecache::network::transport))]
    Transport {
        /// Description of the transport failure
        message: String,
    },

    /// The service answered successfully but the payload was unusable
    #[error("Unexpected cache service response: {message}")]
    #[diagnostic(code(savecache::network::invalid_response))]
    InvalidResponse {
        /// Description of what was wrong with the payload
        message: String,
    },

    /// I/O error reading the archive from disk
    #[error("I/O {operation} failed: {}", path.display())]
    #[diagnostic(code(savecache::network::io))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The archive path involved
        path: Box<Path>,
        /// Operation that failed
        operation: String,
    },

    /// All retry attempts for an upload phase were exhausted
    #[error("Upload failed: {phase} did not succeed after {attempts} attempts: {last_error}")]
    #[diagnostic(
        code(savecache::network::retry_exhausted),
        help("The cache service may be degraded; the build itself is unaffected")
    )]
    RetryExhausted {
        /// The upload phase that gave up
        phase: String,
        /// How many attempts were made
        attempts: u32,
        /// The last error observed
        last_error: String,
    },
}

impl Error {
    /// Create a missing-credential error
    #[must_use]
    pub fn missing_credential(name: &'static str) -> Self {
        Self::MissingCredential { name }
    }

    /// Create a transport error
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an invalid-response error
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: path.as_ref().into(),
            operation: operation.into(),
        }
    }

    /// Create a retry-exhausted error
    #[must_use]
    pub fn retry_exhausted(
        phase: impl Into<String>,
        attempts: u32,
        last_error: impl Into<String>,
    ) -> Self {
        Self::RetryExhausted {
            phase: phase.into(),
            attempts,
            last_error: last_error.into(),
        }
    }

    /// Whether a fresh attempt could plausibly succeed.
    ///
    /// Transport failures, throttling and server errors are transient;
    /// everything else is a terminal answer from the service or the local
    /// environment.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Service { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::MissingCredential { .. }
            | Self::Auth { .. }
            | Self::InvalidResponse { .. }
            | Self::Io { .. }
            | Self::RetryExhausted { .. } => false,
        }
    }
}

/// Result type for upload operations
pub type Result<T> = std::result::Result<T, Error>;
