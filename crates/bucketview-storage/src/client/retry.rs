//! Adaptive retry for storage requests.
//!
//! Each request is retried with exponential backoff. On top of that, every
//! client keeps a [`ThrottleState`]: throttled responses raise it, successes
//! lower it, and while it is raised new attempts are paced before they are
//! sent. A scan that issues one tag request per row therefore slows down as a
//! whole once the service starts pushing back.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{Error, Result, TRACING_TARGET_RETRY};

/// Bounded retry policy applied to every storage request.
///
/// Retryable failures back off exponentially from `base_backoff`, capped at
/// `max_backoff`. When the service sends a throttling hint the hint wins over
/// the computed delay. Non-retryable failures are returned immediately.
/// Pacing under sustained throttling comes from the [`ThrottleState`] passed
/// to [`RetryPolicy::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per request, the first one included.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_backoff: Duration,
    /// Ceiling for any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    /// Sets the total number of attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the base and maximum backoff.
    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.base_backoff = base;
        self.max_backoff = max;
        self
    }

    /// Checks that at least one attempt is allowed and the backoff bounds are ordered.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::Config(
                "Retry policy must allow at least one attempt".to_string(),
            ));
        }

        if self.base_backoff > self.max_backoff {
            return Err(Error::Config(format!(
                "Base backoff {:?} exceeds maximum backoff {:?}",
                self.base_backoff, self.max_backoff
            )));
        }

        Ok(())
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }

    /// Delay inserted before an attempt while the service is throttling.
    pub fn pacing(&self, pressure: u32) -> Duration {
        if pressure == 0 {
            Duration::ZERO
        } else {
            self.backoff(pressure)
        }
    }

    /// Runs `op` until it succeeds, fails permanently or runs out of attempts.
    ///
    /// `throttle` is shared by every request of one client.
    pub async fn execute<T, F, Fut>(
        &self,
        operation: &'static str,
        throttle: &ThrottleState,
        mut op: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;

        loop {
            let pressure = throttle.pressure();
            let pace = self.pacing(pressure);
            if !pace.is_zero() {
                debug!(
                    target: TRACING_TARGET_RETRY,
                    operation,
                    pressure,
                    delay_ms = pace.as_millis() as u64,
                    "Pacing request under throttling"
                );
                tokio::time::sleep(pace).await;
            }

            let outcome = op().await;
            match &outcome {
                Ok(_) => throttle.record_success(),
                Err(e) if e.is_throttling() => throttle.record_throttle(),
                Err(_) => {}
            }

            match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        info!(
                            target: TRACING_TARGET_RETRY,
                            operation,
                            attempt,
                            "Request succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = e
                        .retry_delay()
                        .unwrap_or_else(|| self.backoff(attempt))
                        .min(self.max_backoff);

                    warn!(
                        target: TRACING_TARGET_RETRY,
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Request failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!(
                        target: TRACING_TARGET_RETRY,
                        operation,
                        attempt,
                        retryable = e.is_retryable(),
                        severity = ?e.severity(),
                        "Request failed permanently"
                    );
                    return Err(e);
                }
            }
        }
    }
}

/// Highest pressure a run of throttled responses can build up.
const MAX_PRESSURE: u32 = 16;

/// Throttling pressure observed by one client.
#[derive(Debug, Default)]
pub struct ThrottleState {
    pressure: AtomicU32,
}

impl ThrottleState {
    /// Creates a state with no pressure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current pressure; zero means requests are sent without pacing.
    pub fn pressure(&self) -> u32 {
        self.pressure.load(Ordering::Relaxed)
    }

    fn record_throttle(&self) {
        let _ = self
            .pressure
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |p| {
                Some((p + 1).min(MAX_PRESSURE))
            });
    }

    fn record_success(&self) {
        let _ = self
            .pressure
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |p| {
                Some(p.saturating_sub(1))
            });
    }
}
