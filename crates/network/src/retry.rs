//! Retry logic with exponential backoff for upload phases

use crate::error::{Error, Result};
use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts per upload phase
    pub max_attempts: u32,
    /// Initial backoff duration in milliseconds
    pub initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds
    pub max_backoff_ms: u64,
    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Retry a fallible async operation with exponential backoff.
///
/// Errors for which [`Error::is_retryable`] is false fail immediately;
/// transient errors are retried until `config.max_attempts` is reached,
/// after which the phase surfaces as [`Error::RetryExhausted`].
pub async fn retry_with_backoff<F, Fut, T>(
    config: &RetryConfig,
    phase: &str,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = create_backoff(config);
    let mut attempts = 0;

    loop {
        attempts += 1;

        match f().await {
            Ok(result) => {
                if attempts > 1 {
                    debug!(phase, attempts, "phase succeeded after retry");
                }
                return Ok(result);
            }
            Err(err) => {
                if !err.is_retryable() {
                    debug!(phase, error = %err, "error is not retryable, failing immediately");
                    return Err(err);
                }

                if attempts >= config.max_attempts {
                    warn!(phase, attempts, error = %err, "phase failed after maximum retries");
                    return Err(Error::retry_exhausted(phase, attempts, err.to_string()));
                }

                if let Some(duration) = backoff.next_backoff() {
                    warn!(
                        phase,
                        attempts,
                        error = %err,
                        retry_in_ms = duration.as_millis(),
                        "phase failed, retrying"
                    );
                    tokio::time::sleep(duration).await;
                } else {
                    return Err(Error::retry_exhausted(phase, attempts, err.to_string()));
                }
            }
        }
    }
}

/// Create exponential backoff from config
fn create_backoff(config: &RetryConfig) -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(config.initial_backoff_ms))
        .with_max_interval(Duration::from_millis(config.max_backoff_ms))
        .with_multiplier(config.backoff_multiplier)
        .with_max_elapsed_time(None) // max_attempts bounds the loop instead
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_backoff_ms: 5,
            max_backoff_ms: 20,
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = retry_with_backoff(&fast_config(), "test", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(17)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 17);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = retry_with_backoff(&fast_config(), "test", move || {
            let counter = counter.clone();
            async move {
                let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(Error::transport("connection reset"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_as_upload_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: Result<()> = retry_with_backoff(&fast_config(), "transfer", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(Error::transport("timed out"))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result.unwrap_err(),
            Error::RetryExhausted { attempts: 3, .. }
        ));
    }

    #[tokio::test]
    async fn non_retryable_error_fails_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: Result<()> = retry_with_backoff(&fast_config(), "test", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(Error::Auth { status: 401 })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result.unwrap_err(), Error::Auth { status: 401 }));
    }

    #[test]
    fn throttling_and_server_errors_are_retryable() {
        assert!(Error::transport("reset").is_retryable());
        assert!(
            Error::Service {
                status: 429,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            Error::Service {
                status: 503,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(!Error::Auth { status: 401 }.is_retryable());
        assert!(
            !Error::Service {
                status: 400,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(!Error::missing_credential("token").is_retryable());
    }
}
