//! Command-line interface and error rendering for the savecache binary.

use clap::Parser;
use miette::{Diagnostic, Report};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for a successful run, including the "nothing to cache" case.
pub const EXIT_OK: i32 = 0;
/// Exit code for any failed run.
pub const EXIT_FAILURE: i32 = 1;

/// CLI-facing error type: one terminating message per failed run.
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// Invalid or missing configuration, detected before any work happens
    #[error("Configuration error: {message}")]
    #[diagnostic(code(savecache::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// A pipeline stage failed after configuration was accepted
    #[error("{message}")]
    #[diagnostic(code(savecache::cli::save))]
    Save {
        /// The error message
        message: String,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a pipeline error
    #[must_use]
    pub fn save(message: impl Into<String>) -> Self {
        Self::Save {
            message: message.into(),
        }
    }
}

/// Render the terminating error for a failed run.
pub fn render_error(err: &CliError) {
    let report = Report::new(err.clone());
    eprintln!("{report:?}");
    // Ensure output is flushed before process exit
    let _ = io::stderr().flush();
}

/// Save build outputs to the remote build cache.
///
/// Every option can also be supplied through the environment, which is how
/// the step is normally driven from a pipeline definition.
#[derive(Parser, Debug)]
#[command(name = "savecache")]
#[command(about = "Save build outputs to the remote build cache")]
#[command(version)]
pub struct Cli {
    /// Cache key template, e.g. "deps-{{ .Branch }}".
    #[arg(long, env = "SAVECACHE_KEY")]
    pub key: String,

    /// Newline-delimited list of paths and/or glob patterns to cache.
    #[arg(long, env = "SAVECACHE_PATHS")]
    pub paths: String,

    /// Enable debug logging.
    #[arg(long, env = "SAVECACHE_VERBOSE")]
    pub verbose: bool,

    /// Base URL of the cache service API.
    #[arg(long, env = "CACHE_SERVICE_URL")]
    pub api_url: Option<String>,

    /// Access token for the cache service.
    #[arg(long, env = "CACHE_SERVICE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Build source root, used as the display base for archived paths.
    #[arg(long, env = "CI_SOURCE_DIR")]
    pub source_dir: Option<PathBuf>,
}
