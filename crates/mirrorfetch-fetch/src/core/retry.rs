use std::time::Duration;

use crate::error::{Error, IsRetryable, Result};

pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Delay before the given retry (1-indexed): `retry²` seconds.
///
/// ```
/// use std::time::Duration;
/// use mirrorfetch_fetch::core::retry_delay;
///
/// assert_eq!(retry_delay(1), Duration::from_secs(1));
/// assert_eq!(retry_delay(2), Duration::from_secs(4));
/// assert_eq!(retry_delay(3), Duration::from_secs(9));
/// ```
pub fn retry_delay(retry: u32) -> Duration {
    Duration::from_secs(u64::from(retry).saturating_pow(2))
}

/// Runs an operation, retrying transient failures with quadratic backoff.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Run `op`, waiting between attempts with `sleep`.
    ///
    /// A retryable failure on attempt `n` (while `n <= max_retries`) is logged
    /// and followed by a `n²` second sleep. Any other failure, or a retryable
    /// one after the retries are used up, is returned as is.
    pub fn run_with<T>(
        &self,
        mut sleep: impl FnMut(Duration),
        mut op: impl FnMut() -> Result<T>,
    ) -> Result<T> {
        let mut retries = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    let delay = retry_delay(retries);
                    tracing::warn!(
                        error = %e,
                        attempt = retries,
                        max_retries = self.max_retries,
                        "retrying {} ({}) after {} seconds...",
                        e.kind(),
                        first_line(&e),
                        delay.as_secs()
                    );
                    sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn first_line(e: &Error) -> String {
    e.to_string().lines().next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn unavailable() -> Error {
        Error::Http {
            status: 503,
            reason: "Service Unavailable".to_string(),
        }
    }

    #[test]
    fn test_retry_delay_is_quadratic() {
        assert_eq!(retry_delay(0), Duration::ZERO);
        assert_eq!(retry_delay(1), Duration::from_secs(1));
        assert_eq!(retry_delay(4), Duration::from_secs(16));
        assert_eq!(retry_delay(10), Duration::from_secs(100));
    }

    #[test]
    fn test_success_after_three_unavailable() {
        let slept = RefCell::new(Vec::new());
        let mut calls = 0;
        let result = RetryPolicy::default().run_with(
            |d| slept.borrow_mut().push(d),
            || {
                calls += 1;
                if calls <= 3 { Err(unavailable()) } else { Ok(calls) }
            },
        );

        assert_eq!(result.unwrap(), 4);
        let total: Duration = slept.borrow().iter().sum();
        assert_eq!(total, Duration::from_secs(1 + 4 + 9));
    }

    #[test]
    fn test_non_retryable_fails_immediately() {
        let mut calls = 0;
        let result: Result<()> = RetryPolicy::default().run_with(
            |_| panic!("must not sleep"),
            || {
                calls += 1;
                Err(Error::Http {
                    status: 404,
                    reason: "Not Found".to_string(),
                })
            },
        );

        assert_eq!(result.unwrap_err().status(), Some(404));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_gives_up_after_max_retries() {
        let mut calls = 0;
        let mut sleeps = 0;
        let result: Result<()> = RetryPolicy::new(2).run_with(
            |_| sleeps += 1,
            || {
                calls += 1;
                Err(Error::ReadTimeout("slow".into()))
            },
        );

        assert!(matches!(result, Err(Error::ReadTimeout(_))));
        assert_eq!(calls, 3);
        assert_eq!(sleeps, 2);
    }

    #[test]
    fn test_zero_retries_runs_once() {
        let mut calls = 0;
        let result: Result<()> = RetryPolicy::new(0).run_with(
            |_| panic!("must not sleep"),
            || {
                calls += 1;
                Err(unavailable())
            },
        );
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
