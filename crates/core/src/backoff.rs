//! Exponential backoff policy (pure data, no I/O).
//!
//! The policy protects the store's provisioned throughput: every consecutive
//! throttled call doubles the wait before the next one, and a fixed attempt
//! ceiling bounds the total time spent waiting.

use std::time::Duration;

/// Default wait after the first throttled call.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);
/// Default delay multiplier between consecutive throttled calls.
pub const DEFAULT_FACTOR: u32 = 2;
/// Default number of attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Parameters of the exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub factor: u32,
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            factor: DEFAULT_FACTOR,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl BackoffPolicy {
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Attempt ceiling; at least one attempt is always made.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// State at the start of a new unit of work.
    pub fn start(&self) -> BackoffState {
        BackoffState {
            delay: self.initial_delay,
            attempt: 0,
        }
    }

    /// Wait after a throttled attempt `attempt` (zero-based): `initial * factor^attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.factor
            .checked_pow(attempt)
            .and_then(|multiplier| self.initial_delay.checked_mul(multiplier))
            .unwrap_or(Duration::MAX)
    }

    /// Sum of every wait taken before the attempt ceiling is reached.
    pub fn total_budget(&self) -> Duration {
        (0..self.max_attempts)
            .map(|attempt| self.delay_for_attempt(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

/// Mutable retry state carried across attempts of one logical operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffState {
    pub delay: Duration,
    pub attempt: u32,
}

impl BackoffState {
    /// True once `attempt` has reached the policy ceiling.
    pub fn is_exhausted(&self, policy: &BackoffPolicy) -> bool {
        self.attempt >= policy.max_attempts
    }

    /// State after a throttled attempt: the delay grows, the attempt count advances.
    pub fn escalate(self, policy: &BackoffPolicy) -> Self {
        Self {
            delay: self
                .delay
                .checked_mul(policy.factor)
                .unwrap_or(Duration::MAX),
            attempt: self.attempt + 1,
        }
    }

    /// State after a partial acknowledgment: same delay, fresh attempt budget.
    pub fn restart(self) -> Self {
        Self {
            delay: self.delay,
            attempt: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.initial_delay, Duration::from_millis(1000));
        assert_eq!(policy.factor, 2);
        assert_eq!(policy.max_attempts, 10);
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = BackoffPolicy::default();
        for k in 0..10 {
            assert_eq!(
                policy.delay_for_attempt(k),
                Duration::from_millis(1000 * 2u64.pow(k))
            );
        }
        assert_eq!(policy.delay_for_attempt(9), Duration::from_secs(512));
    }

    #[test]
    fn test_escalate_matches_delay_for_attempt() {
        let policy = BackoffPolicy::default();
        let mut state = policy.start();
        for k in 0..10 {
            assert_eq!(state.attempt, k);
            assert_eq!(state.delay, policy.delay_for_attempt(k));
            assert!(!state.is_exhausted(&policy));
            state = state.escalate(&policy);
        }
        assert!(state.is_exhausted(&policy));
    }

    #[test]
    fn test_restart_keeps_delay_and_resets_attempt() {
        let policy = BackoffPolicy::default();
        let state = policy.start().escalate(&policy).escalate(&policy);
        let restarted = state.restart();
        assert_eq!(restarted.attempt, 0);
        assert_eq!(restarted.delay, Duration::from_secs(4));
    }

    #[test]
    fn test_max_attempts_is_at_least_one() {
        let policy = BackoffPolicy::default().with_max_attempts(0);
        assert_eq!(policy.max_attempts, 1);
        assert!(!policy.start().is_exhausted(&policy));
    }

    #[test]
    fn test_total_budget() {
        assert_eq!(
            BackoffPolicy::default().total_budget(),
            Duration::from_secs(1023)
        );
    }

    #[test]
    fn test_delay_saturates_instead_of_overflowing() {
        let policy = BackoffPolicy::default().with_max_attempts(200);
        assert_eq!(policy.delay_for_attempt(150), Duration::MAX);
        let mut state = policy.start();
        for _ in 0..150 {
            state = state.escalate(&policy);
        }
        assert_eq!(state.delay, Duration::MAX);
    }
}
