//! Element polling utility for pages that render results via JavaScript
//!
//! Provides [`wait_for_any`], which polls for the first of several selectors
//! with exponential backoff. Result pages do not always use the same markup,
//! so the caller hands in every container selector it knows about.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use super::delay::Sleeper;

/// Wait for any of `selectors` to appear, using exponential backoff polling
///
/// # Arguments
/// * `selectors` - CSS selectors, checked in order on every poll
/// * `timeout` - Maximum wall-clock time to spend, probes included
/// * `sleeper` - Where the poll intervals are spent
/// * `probe` - Returns true when the selector matches an element on the page
///
/// # Returns
/// The first selector that matched, or `None` once the timeout is used up.
///
/// # Polling Strategy
/// - Starts at 100ms intervals
/// - Doubles each retry (exponential backoff)
/// - Caps at 1 second maximum interval
/// - Intervals never add up to more than the timeout
pub async fn wait_for_any<'s, P, Fut>(
    selectors: &[&'s str],
    timeout: Duration,
    sleeper: &dyn Sleeper,
    probe: P,
) -> Option<&'s str>
where
    P: FnMut(&'s str) -> Fut,
    Fut: Future<Output = bool>,
{
    let found = tokio::time::timeout(timeout, poll(selectors, timeout, sleeper, probe))
        .await
        .ok()
        .flatten();

    if found.is_none() {
        debug!(
            "None of {} selector(s) matched within {}ms",
            selectors.len(),
            timeout.as_millis()
        );
    }
    found
}

async fn poll<'s, P, Fut>(
    selectors: &[&'s str],
    timeout: Duration,
    sleeper: &dyn Sleeper,
    mut probe: P,
) -> Option<&'s str>
where
    P: FnMut(&'s str) -> Fut,
    Fut: Future<Output = bool>,
{
    let mut waited = Duration::ZERO;
    let mut poll_interval = Duration::from_millis(100);
    let max_interval = Duration::from_secs(1);

    loop {
        for &selector in selectors {
            if probe(selector).await {
                debug!("Selector '{}' matched after {}ms of polling", selector, waited.as_millis());
                return Some(selector);
            }
        }

        if waited >= timeout {
            return None;
        }

        let step = poll_interval.min(timeout - waited);
        sleeper.sleep(step).await;
        waited += step;

        poll_interval = (poll_interval * 2).min(max_interval);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::utils::delay::testing::RecordingSleeper;

    #[tokio::test]
    async fn test_returns_first_matching_selector() {
        let sleeper = RecordingSleeper::default();
        let found = wait_for_any(
            &[".gs_r", ".gs_ri"],
            Duration::from_secs(15),
            &sleeper,
            |sel| async move { sel == ".gs_ri" },
        )
        .await;

        assert_eq!(found, Some(".gs_ri"));
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_appears_after_a_few_polls() {
        let sleeper = RecordingSleeper::default();
        let polls = AtomicU32::new(0);
        let found = wait_for_any(&[".gs_r"], Duration::from_secs(15), &sleeper, |_| {
            let n = polls.fetch_add(1, Ordering::SeqCst);
            async move { n >= 3 }
        })
        .await;

        assert_eq!(found, Some(".gs_r"));
        assert_eq!(
            sleeper.recorded(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
            ]
        );
    }

    #[tokio::test]
    async fn test_gives_up_after_timeout_budget() {
        let sleeper = RecordingSleeper::default();
        let found = wait_for_any(
            &[".gs_r"],
            Duration::from_millis(15_000),
            &sleeper,
            |_| async { false },
        )
        .await;

        assert_eq!(found, None);
        let total: Duration = sleeper.recorded().iter().sum();
        assert_eq!(total, Duration::from_millis(15_000));
        assert!(sleeper.recorded().iter().all(|d| *d <= Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_slow_probes_count_against_timeout() {
        let sleeper = RecordingSleeper::default();
        let started = std::time::Instant::now();
        let found = wait_for_any(
            &[".gs_r.gs_or.gs_scl", ".gs_ri", ".gs_r", "[data-lid]"],
            Duration::from_millis(300),
            &sleeper,
            |_| async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                false
            },
        )
        .await;

        assert_eq!(found, None);
        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
