//! Retry policy: exponential backoff with jitter
//!
//! Only idempotent operations retry, and only on transient failures
//! (transport errors and HTTP 5xx). The operation timeout bounds the
//! whole loop, sleeps included.

use crate::error::{ClientError, ClientResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Backoff configuration (base 500 ms, doubling, capped at 8 s, 10%
/// jitter)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Backoff delay before retry number `attempt` (0-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(20))
            .min(self.max_delay_ms);
        let ms = if self.jitter {
            let factor: f64 = rand::thread_rng().gen_range(0.9..=1.1);
            (exp as f64 * factor) as u64
        } else {
            exp
        };
        Duration::from_millis(ms)
    }

    /// Run `f` under this policy. `f` receives the remaining time
    /// budget for its attempt; the configured `timeout` bounds the
    /// attempts and the sleeps between them.
    pub fn execute<T, F>(&self, timeout: Duration, idempotent: bool, mut f: F) -> ClientResult<T>
    where
        F: FnMut(Duration) -> ClientResult<T>,
    {
        let deadline = Instant::now() + timeout;
        let mut attempt: u32 = 0;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(ClientError::Timeout(timeout));
            }
            match f(deadline - now) {
                Ok(value) => {
                    if attempt > 0 {
                        info!(attempt, "operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) if idempotent && error.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay(attempt);
                    attempt += 1;
                    if Instant::now() + delay >= deadline {
                        warn!(error = %error, "retry budget exhausted by timeout");
                        return Err(ClientError::Timeout(timeout));
                    }
                    debug!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "retrying after transient failure"
                    );
                    std::thread::sleep(delay);
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay_ms: 1,
            max_delay_ms: 8,
            jitter: false,
        }
    }

    #[test]
    fn delays_double_and_cap() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            jitter: false,
        };
        assert_eq!(policy.delay(0), Duration::from_millis(500));
        assert_eq!(policy.delay(1), Duration::from_millis(1_000));
        assert_eq!(policy.delay(2), Duration::from_millis(2_000));
        assert_eq!(policy.delay(4), Duration::from_millis(8_000));
        assert_eq!(policy.delay(10), Duration::from_millis(8_000));
    }

    #[test]
    fn jitter_stays_within_ten_percent() {
        let policy = RetryPolicy {
            max_retries: 1,
            base_delay_ms: 1_000,
            max_delay_ms: 8_000,
            jitter: true,
        };
        for _ in 0..50 {
            let d = policy.delay(0).as_millis() as u64;
            assert!((900..=1_100).contains(&d), "delay {d} out of jitter band");
        }
    }

    #[test]
    fn transient_failures_retry_until_success() {
        let calls = Cell::new(0u32);
        let result = policy().execute(Duration::from_secs(5), true, |_| {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(ClientError::Connection("reset".into()))
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn non_idempotent_operations_never_retry() {
        let calls = Cell::new(0u32);
        let result: ClientResult<()> = policy().execute(Duration::from_secs(5), false, |_| {
            calls.set(calls.get() + 1);
            Err(ClientError::Connection("reset".into()))
        });
        assert!(matches!(result, Err(ClientError::Connection(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn non_retryable_errors_surface_immediately() {
        let calls = Cell::new(0u32);
        let result: ClientResult<()> = policy().execute(Duration::from_secs(5), true, |_| {
            calls.set(calls.get() + 1);
            Err(ClientError::Http {
                status: 404,
                reason: "missing".into(),
            })
        });
        assert!(matches!(result, Err(ClientError::Http { status: 404, .. })));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn retries_stop_at_the_budget() {
        let calls = Cell::new(0u32);
        let result: ClientResult<()> = policy().execute(Duration::from_secs(5), true, |_| {
            calls.set(calls.get() + 1);
            Err(ClientError::Connection("reset".into()))
        });
        assert!(matches!(result, Err(ClientError::Connection(_))));
        // 1 initial + 3 retries
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn timeout_bounds_the_whole_loop() {
        let result: ClientResult<()> =
            policy().execute(Duration::from_millis(0), true, |_| unreachable!());
        assert!(matches!(result, Err(ClientError::Timeout(_))));
    }
}
