//! Error types for path resolution

use miette::Diagnostic;
use thiserror::Error;

/// Error type for path resolution
///
/// Per-entry problems (missing paths, bad patterns) are not errors; they
/// are reported as [`crate::Skipped`] entries on the resolution result.
/// This enum covers only conditions that invalidate the whole resolution.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The working directory the spec should resolve against is unusable
    #[error("Invalid working directory: {message}")]
    #[diagnostic(
        code(savecache::paths::working_dir),
        help("The working directory must be an absolute path on this filesystem")
    )]
    WorkingDir {
        /// Description of the problem
        message: String,
    },
}

impl Error {
    /// Create a working-directory error
    #[must_use]
    pub fn working_dir(message: impl Into<String>) -> Self {
        Self::WorkingDir {
            message: message.into(),
        }
    }
}

/// Result type for path resolution
pub type Result<T> = std::result::Result<T, Error>;
