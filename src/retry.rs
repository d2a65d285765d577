//! Bounded exponential backoff for price resolution.

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::Result;

/// How often and how patiently an operation is retried.
///
/// Only [`PriceNotFound`](crate::TrackerError::PriceNotFound) is retried; every other error is
/// returned on the spot. Delays grow geometrically with no jitter, so the
/// schedule is fully determined by the policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Growth factor applied after every retry.
    pub multiplier: u32,
    /// Upper bound for a single delay.
    pub max_backoff: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(1),
            multiplier: 2,
            max_backoff: None,
        }
    }
}

impl RetryPolicy {
    /// A policy that never waits between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            multiplier: 1,
            max_backoff: None,
        }
    }

    /// The waits between consecutive attempts (`max_attempts - 1` entries).
    pub fn delays(&self) -> Vec<Duration> {
        let mut delays = Vec::new();
        let mut next = self.initial_backoff;
        for _ in 1..self.max_attempts.max(1) {
            let capped = match self.max_backoff {
                Some(max) => next.min(max),
                None => next,
            };
            delays.push(capped);
            next = next.saturating_mul(self.multiplier);
        }
        delays
    }

    /// Run `op`, retrying while it fails with `PriceNotFound`.
    ///
    /// `op` receives the 1-based attempt number. After the last attempt the
    /// final `PriceNotFound` is returned unchanged.
    pub fn run<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Result<T>,
    {
        let delays = self.delays();
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_price_not_found() && (attempt as usize) <= delays.len() => {
                    let delay = delays[attempt as usize - 1];
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "{}; backing off",
                        e
                    );
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

