//! Bounded exponential-backoff retry for fallible external calls.
//!
//! Explicit policy object rather than a cross-cutting wrapper: each call
//! site composes its own [`RetryPolicy`] so the attempt budget and wait
//! bounds are directly unit-testable.

use std::time::Duration;

/// Retry policy: at most `max_attempts` total attempts, sleeping an
/// exponentially growing, bounded duration between failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1)
    pub max_attempts: u32,
    /// Lower bound on the inter-attempt wait
    pub min_wait: Duration,
    /// Upper bound on the inter-attempt wait
    pub max_wait: Duration,
    /// Base multiplier for the exponential term
    pub multiplier: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, min_wait: Duration, max_wait: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            min_wait,
            max_wait,
            multiplier: Duration::from_secs(1),
        }
    }

    /// Wait before retry number `attempt` (1-based count of failures so far):
    /// `clamp(multiplier * 2^(attempt-1), min_wait, max_wait)`.
    pub fn wait_before(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.multiplier
            .saturating_mul(factor)
            .clamp(self.min_wait, self.max_wait)
    }

    /// Run `op` until it succeeds or the attempt budget is exhausted.
    ///
    /// Sleeps between attempts; the final error is propagated unchanged.
    pub fn run<T, E: std::fmt::Display>(
        &self,
        label: &str,
        mut op: impl FnMut() -> Result<T, E>,
    ) -> Result<T, E> {
        let mut failures = 0u32;
        loop {
            match op() {
                Ok(v) => return Ok(v),
                Err(e) if failures + 1 < self.max_attempts => {
                    failures += 1;
                    let wait = self.wait_before(failures);
                    log::debug!(
                        "{label}: attempt {failures}/{} failed: {e}, retrying in {wait:?}",
                        self.max_attempts
                    );
                    std::thread::sleep(wait);
                }
                Err(e) => {
                    log::debug!("{label}: giving up after {} attempts: {e}", failures + 1);
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Policy with zero waits so tests never sleep
    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    #[test]
    fn first_success_single_attempt() {
        let mut calls = 0;
        let result: Result<i32, String> = instant_policy(3).run("test", || {
            calls += 1;
            Ok(42)
        });
        assert_eq!(result, Ok(42));
        assert_eq!(calls, 1);
    }

    #[test]
    fn always_failing_op_attempted_exactly_max_times() {
        let mut calls = 0;
        let result: Result<(), String> = instant_policy(3).run("test", || {
            calls += 1;
            Err("nope".to_string())
        });
        assert_eq!(result, Err("nope".to_string()));
        assert_eq!(calls, 3);
    }

    #[test]
    fn recovers_after_transient_failures() {
        let mut calls = 0;
        let result: Result<i32, String> = instant_policy(3).run("test", || {
            calls += 1;
            if calls < 3 { Err("flaky".to_string()) } else { Ok(7) }
        });
        assert_eq!(result, Ok(7));
        assert_eq!(calls, 3);
    }

    #[test]
    fn zero_attempts_treated_as_one() {
        let mut calls = 0;
        let result: Result<(), String> = instant_policy(0).run("test", || {
            calls += 1;
            Err("nope".to_string())
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn backoff_exponential_within_bounds() {
        let policy = RetryPolicy::new(5, Duration::from_secs(4), Duration::from_secs(10));
        // 1*2^0=1 → clamped up to 4; 2^2=4 → 4; 2^3=8 → 8; 2^4=16 → clamped to 10
        assert_eq!(policy.wait_before(1), Duration::from_secs(4));
        assert_eq!(policy.wait_before(2), Duration::from_secs(4));
        assert_eq!(policy.wait_before(3), Duration::from_secs(4));
        assert_eq!(policy.wait_before(4), Duration::from_secs(8));
        assert_eq!(policy.wait_before(5), Duration::from_secs(10));
    }

    #[test]
    fn backoff_non_decreasing() {
        let policy = RetryPolicy::new(8, Duration::from_millis(100), Duration::from_secs(10));
        let mut prev = Duration::ZERO;
        for attempt in 1..=8 {
            let wait = policy.wait_before(attempt);
            assert!(wait >= prev);
            assert!(wait >= policy.min_wait);
            assert!(wait <= policy.max_wait);
            prev = wait;
        }
    }
}
