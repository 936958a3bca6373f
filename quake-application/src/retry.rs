// Bounded-attempt retry for remote catalog calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use quake_domain::{CatalogError, RuntimeConfig};

use crate::cancel::CancelToken;
use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 500,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            max_attempts: config.retry_attempts.max(1),
            backoff_ms: config.retry_backoff_ms,
        }
    }
}

/// Run `op`, retrying transient failures with linear backoff until the
/// attempt budget is spent. Non-transient failures and cancellation cut
/// the loop immediately.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    what: &str,
    mut op: F,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            result = op() => result,
        };
        match result {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < max_attempts => {
                warn!("{what} attempt {attempt}/{max_attempts} failed, retrying: {err}");
                let pause = Duration::from_millis(policy.backoff_ms * u64::from(attempt));
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(AppError::Cancelled),
                    _ = tokio::time::sleep(pause) => {}
                }
                attempt += 1;
            }
            Err(err) if err.is_transient() => {
                return Err(AppError::RemoteExhausted {
                    attempts: attempt,
                    source: err,
                })
            }
            Err(err) => return Err(AppError::Remote(err)),
        }
    }
}
