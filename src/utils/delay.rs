//! Bounded random pauses and the sleeping seam used by retries and polling
//!
//! Every intentional suspension in the acquisition layer goes through a
//! [`Sleeper`], so tests can record the requested durations instead of
//! waiting on the wall clock.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

/// Something that can suspend the current task for a duration
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Shared default sleeper
pub fn tokio_sleeper() -> Arc<dyn Sleeper> {
    Arc::new(TokioSleeper)
}

/// Pick a random duration in `[min, max]` (inclusive, millisecond resolution)
///
/// Bounds given in the wrong order are swapped rather than rejected.
pub fn random_delay(min: Duration, max: Duration) -> Duration {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let lo_ms = lo.as_millis() as u64;
    let hi_ms = hi.as_millis() as u64;
    if lo_ms == hi_ms {
        return Duration::from_millis(lo_ms);
    }
    Duration::from_millis(rand::rng().random_range(lo_ms..=hi_ms))
}

/// Sleep for a random duration in `[min, max]`, returning the chosen pause
pub async fn pause(sleeper: &dyn Sleeper, min: Duration, max: Duration) -> Duration {
    let delay = random_delay(min, max);
    tracing::debug!("Pausing {}ms before next request", delay.as_millis());
    sleeper.sleep(delay).await;
    delay
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Sleeper that records requested durations and returns immediately
    #[derive(Default)]
    pub(crate) struct RecordingSleeper {
        pub(crate) calls: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub(crate) fn recorded(&self) -> Vec<Duration> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(duration);
            }
        }
    }
}
