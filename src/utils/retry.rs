//! Bounded exponential retry for flaky HTTP endpoints
//!
//! Client errors are never retried: a 404 or 400 will not improve by asking
//! again. Rate limiting (429), server errors and failures that never produced
//! a status (connection resets, response timeouts) are retried with a delay
//! of `base_delay * 2^(attempt - 1)` before each further attempt.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::constants::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_RETRIES};
use super::delay::Sleeper;
use super::errors::SourceError;

/// Retry policy for a single remote call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts (0 behaves like 1)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    /// Delay to wait after `attempt` (1-based) failed
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

/// Classifies an error as worth retrying
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Client-class statuses are permanent, except 429
pub fn is_permanent_status(status: u16) -> bool {
    (400..499).contains(&status) && status != 429
}

impl Transient for SourceError {
    fn is_transient(&self) -> bool {
        match self.status() {
            Some(status) => !is_permanent_status(status),
            None => matches!(self, SourceError::Request(_) | SourceError::Timeout { .. }),
        }
    }
}

/// Last error of a retried call together with how many attempts were made
#[derive(Error, Debug)]
#[error("{error} (after {attempts} attempt(s))")]
pub struct RetryFailure<E: std::error::Error + 'static> {
    #[source]
    pub error: E,
    pub attempts: u32,
}

impl<E: std::error::Error + 'static> RetryFailure<E> {
    pub fn into_inner(self) -> E {
        self.error
    }
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out
///
/// # Arguments
/// * `config` - Attempt budget and base delay
/// * `sleeper` - Where waits between attempts are spent
/// * `operation` - Zero-argument async operation, invoked once per attempt
pub async fn retry_with_backoff<T, E, F, Fut>(
    config: &RetryConfig,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> Result<T, RetryFailure<E>>
where
    E: Transient + std::error::Error + 'static,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = config.max_retries.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if !error.is_transient() => {
                debug!("Attempt {attempt} failed permanently: {error}");
                return Err(RetryFailure {
                    error,
                    attempts: attempt,
                });
            }
            Err(error) if attempt >= max_attempts => {
                warn!("Giving up after {attempt} attempt(s): {error}");
                return Err(RetryFailure {
                    error,
                    attempts: attempt,
                });
            }
            Err(error) => {
                let delay = config.delay_after(attempt);
                warn!(
                    "Attempt {}/{} failed: {}. Retrying in {}ms",
                    attempt,
                    max_attempts,
                    error,
                    delay.as_millis()
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
