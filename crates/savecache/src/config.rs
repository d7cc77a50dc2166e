//! Validated step configuration.

use crate::cli::{Cli, CliError};
use std::path::PathBuf;
use tracing::info;

/// The step's validated inputs.
///
/// Configuration problems are the cheapest failures there are, so all of
/// them surface here: before the key is evaluated, before any path is
/// touched and long before any network call.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache key template.
    pub key: String,
    /// Raw newline-delimited path specification.
    pub paths: String,
    /// Debug logging enabled.
    pub verbose: bool,
    /// Cache service API base URL.
    pub api_base_url: String,
    /// Cache service access token.
    pub token: String,
    /// Directory path entries resolve against.
    pub working_dir: PathBuf,
    /// Build source root, display base for archived paths.
    pub source_dir: PathBuf,
}

impl Config {
    /// Validate the parsed command line into a runnable configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`CliError::Config`] for a blank key or missing service
    /// credentials, and when the working directory cannot be determined.
    pub fn from_cli(cli: Cli) -> Result<Self, CliError> {
        if cli.key.trim().is_empty() {
            return Err(CliError::config("cache key should not be empty"));
        }

        let api_base_url = cli.api_url.unwrap_or_default();
        if api_base_url.trim().is_empty() {
            return Err(CliError::config_with_help(
                "cache service URL is not set",
                "Provide --api-url or set CACHE_SERVICE_URL",
            ));
        }
        let token = cli.token.unwrap_or_default();
        if token.trim().is_empty() {
            return Err(CliError::config_with_help(
                "cache service access token is not set",
                "Provide --token or set CACHE_SERVICE_TOKEN",
            ));
        }

        let working_dir = std::env::current_dir().map_err(|e| {
            CliError::config(format!("failed to determine working directory: {e}"))
        })?;
        let source_dir = cli.source_dir.unwrap_or_else(|| working_dir.clone());

        Ok(Self {
            key: cli.key,
            paths: cli.paths,
            verbose: cli.verbose,
            api_base_url,
            token,
            working_dir,
            source_dir,
        })
    }

    /// Echo the accepted configuration, with the token redacted.
    pub fn log_summary(&self) {
        info!(key = %self.key, "cache key template");
        for entry in self.paths.lines().filter(|l| !l.trim().is_empty()) {
            info!(path = entry, "cache path entry");
        }
        info!(
            api_base_url = %self.api_base_url,
            token = "***",
            source_dir = %self.source_dir.display(),
            verbose = self.verbose,
            "step configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(key: &str, api_url: Option<&str>, token: Option<&str>) -> Cli {
        Cli {
            key: key.to_string(),
            paths: "target/".to_string(),
            verbose: false,
            api_url: api_url.map(str::to_string),
            token: token.map(str::to_string),
            source_dir: None,
        }
    }

    #[test]
    fn accepts_complete_configuration() {
        let config =
            Config::from_cli(cli("deps-{{ .Branch }}", Some("https://cache.example"), Some("tok")))
                .unwrap();
        assert_eq!(config.key, "deps-{{ .Branch }}");
        assert!(config.working_dir.is_absolute());
        assert_eq!(config.source_dir, config.working_dir);
    }

    #[test]
    fn blank_key_is_rejected() {
        let err = Config::from_cli(cli("   ", Some("https://cache.example"), Some("tok")))
            .unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }

    #[test]
    fn missing_service_url_is_rejected() {
        let err = Config::from_cli(cli("key", None, Some("tok"))).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }

    #[test]
    fn blank_token_is_rejected() {
        let err = Config::from_cli(cli("key", Some("https://cache.example"), Some("  ")))
            .unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }
}
