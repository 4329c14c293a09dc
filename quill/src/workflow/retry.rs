//! Retry policy for whole workflow runs.
//!
//! Attempts are counted from 1. `max_attempts` is the total number of runs,
//! so a policy with one attempt never retries.

use std::time::Duration;

/// How many runs to try and how long to wait between them.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryPolicy {
    /// Single attempt.
    None,
    /// Constant delay between attempts.
    Fixed {
        max_attempts: usize,
        interval: Duration,
    },
    /// Delay grows by `multiplier` after each failed attempt, capped at `max_interval`.
    Exponential {
        max_attempts: usize,
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    },
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy::None
    }

    pub fn fixed(max_attempts: usize, interval: Duration) -> Self {
        RetryPolicy::Fixed {
            max_attempts,
            interval,
        }
    }

    pub fn exponential(
        max_attempts: usize,
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    ) -> Self {
        RetryPolicy::Exponential {
            max_attempts,
            initial_interval,
            max_interval,
            multiplier,
        }
    }

    /// Total number of runs, never less than one.
    pub fn max_attempts(&self) -> usize {
        match self {
            RetryPolicy::None => 1,
            RetryPolicy::Fixed { max_attempts, .. }
            | RetryPolicy::Exponential { max_attempts, .. } => (*max_attempts).max(1),
        }
    }

    /// Whether another run follows failed attempt number `attempt`.
    pub fn should_retry(&self, attempt: usize) -> bool {
        attempt < self.max_attempts()
    }

    /// Wait after failed attempt number `attempt` (1-based).
    pub fn delay(&self, attempt: usize) -> Duration {
        match self {
            RetryPolicy::None => Duration::ZERO,
            RetryPolicy::Fixed { interval, .. } => *interval,
            RetryPolicy::Exponential {
                initial_interval,
                max_interval,
                multiplier,
                ..
            } => {
                let exp = attempt.saturating_sub(1) as i32;
                let secs = initial_interval.as_secs_f64() * multiplier.powi(exp);
                if !secs.is_finite() || secs >= max_interval.as_secs_f64() {
                    *max_interval
                } else {
                    Duration::from_secs_f64(secs.max(0.0))
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_none() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.max_attempts(), 1);
        assert!(!policy.should_retry(1));
        assert_eq!(policy.delay(1), Duration::ZERO);
    }

    #[test]
    fn test_retry_policy_fixed() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(1000));
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
        assert_eq!(policy.delay(2), Duration::from_millis(1000));
    }

    #[test]
    fn test_retry_policy_exponential_with_cap() {
        let policy =
            RetryPolicy::exponential(5, Duration::from_secs(1), Duration::from_secs(5), 2.0);
        assert_eq!(policy.delay(1), Duration::from_secs(1));
        assert_eq!(policy.delay(2), Duration::from_secs(2));
        assert_eq!(policy.delay(3), Duration::from_secs(4));
        assert_eq!(policy.delay(4), Duration::from_secs(5));
    }

    #[test]
    fn zero_attempts_still_runs_once() {
        assert_eq!(RetryPolicy::fixed(0, Duration::ZERO).max_attempts(), 1);
    }
}
