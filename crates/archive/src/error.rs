//! Error types for archive construction

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for archive construction
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error during archive construction
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(savecache::archive::io),
        help("Check file permissions and available disk space")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "create", "stat")
        operation: String,
    },

    /// The packaging pipeline itself failed
    #[error("Archive creation failed: {message}")]
    #[diagnostic(code(savecache::archive::creation))]
    Creation {
        /// Combined diagnostic output from the packaging pipeline
        message: String,
    },
}

impl Error {
    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create a creation error carrying the pipeline's diagnostic output
    #[must_use]
    pub fn creation(message: impl Into<String>) -> Self {
        Self::Creation {
            message: message.into(),
        }
    }
}

/// Result type for archive construction
pub type Result<T> = std::result::Result<T, Error>;
