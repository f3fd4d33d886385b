//! Per-account failed-attempt tracking and temporary lockout.
//!
//! State transitions are pure functions over [`LockoutState`]; the caller
//! supplies the clock and persists the returned state on the account record.
//! An account is locked once the failed-attempt counter reaches the threshold
//! and unlocks only by expiry of the lockout period. A failure submitted
//! while already locked still increments the counter, extending the lockout
//! window from that attempt.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lockout policy: how many failures are tolerated and for how long an
/// account stays locked.
#[derive(Debug, Clone)]
pub struct LockoutConfig {
    pub max_failed_attempts: u32,
    pub lockout_duration: Duration,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_duration: Duration::minutes(15),
        }
    }
}

/// Per-account lockout state, persisted alongside the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutState {
    pub failed_attempts: u32,
    pub lockout_until: Option<DateTime<Utc>>,
    pub last_attempt: DateTime<Utc>,
}

impl LockoutState {
    /// Fresh state for a newly created account.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            failed_attempts: 0,
            lockout_until: None,
            last_attempt: now,
        }
    }

    /// Record a failed authentication attempt.
    ///
    /// Increments the counter unconditionally; once it reaches the threshold
    /// the lockout expiry is (re)set to `now + lockout_duration`.
    pub fn record_failure(&self, config: &LockoutConfig, now: DateTime<Utc>) -> Self {
        let failed_attempts = self.failed_attempts + 1;
        let lockout_until = if failed_attempts >= config.max_failed_attempts {
            Some(now + config.lockout_duration)
        } else {
            self.lockout_until
        };

        Self {
            failed_attempts,
            lockout_until,
            last_attempt: now,
        }
    }

    /// Reset after a successful authentication.
    pub fn record_success(now: DateTime<Utc>) -> Self {
        Self {
            failed_attempts: 0,
            lockout_until: None,
            last_attempt: now,
        }
    }

    /// True iff a lockout expiry is set and still in the future.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lockout_until.is_some_and(|until| now < until)
    }

    /// Time until the lockout expires; zero when not locked.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        match self.lockout_until {
            Some(until) if now < until => until - now,
            _ => Duration::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail_n(state: LockoutState, config: &LockoutConfig, now: DateTime<Utc>, n: u32) -> LockoutState {
        (0..n).fold(state, |s, _| s.record_failure(config, now))
    }

    #[test]
    fn test_open_below_threshold() {
        let now = Utc::now();
        let config = LockoutConfig::default();
        let state = fail_n(LockoutState::new(now), &config, now, 4);

        assert_eq!(state.failed_attempts, 4);
        assert!(!state.is_locked(now));
        assert_eq!(state.remaining(now), Duration::zero());
    }

    #[test]
    fn test_locked_at_threshold() {
        let now = Utc::now();
        let config = LockoutConfig::default();
        let state = fail_n(LockoutState::new(now), &config, now, 5);

        assert_eq!(state.failed_attempts, 5);
        assert!(state.is_locked(now));
        assert_eq!(state.lockout_until, Some(now + Duration::minutes(15)));
    }

    #[test]
    fn test_success_resets_regardless_of_prior_state() {
        let now = Utc::now();
        let config = LockoutConfig::default();
        let locked = fail_n(LockoutState::new(now), &config, now, 7);
        assert!(locked.is_locked(now));

        let state = LockoutState::record_success(now);
        assert_eq!(state.failed_attempts, 0);
        assert_eq!(state.lockout_until, None);
        assert!(!state.is_locked(now));
    }

    #[test]
    fn test_lockout_expires_by_duration() {
        let now = Utc::now();
        let config = LockoutConfig::default();
        let state = fail_n(LockoutState::new(now), &config, now, 5);

        let later = now + Duration::minutes(16);
        assert!(!state.is_locked(later));
        assert_eq!(state.remaining(later), Duration::zero());
    }

    #[test]
    fn test_failure_while_locked_extends_window() {
        let now = Utc::now();
        let config = LockoutConfig::default();
        let state = fail_n(LockoutState::new(now), &config, now, 5);

        // A further failure during lockout still increments and re-arms the
        // expiry from the new attempt time.
        let later = now + Duration::minutes(10);
        let state = state.record_failure(&config, later);

        assert_eq!(state.failed_attempts, 6);
        assert_eq!(state.lockout_until, Some(later + Duration::minutes(15)));
        assert!(state.is_locked(now + Duration::minutes(20)));
    }

    #[test]
    fn test_remaining_counts_down() {
        let now = Utc::now();
        let config = LockoutConfig::default();
        let state = fail_n(LockoutState::new(now), &config, now, 5);

        assert_eq!(state.remaining(now), Duration::minutes(15));
        assert_eq!(
            state.remaining(now + Duration::minutes(5)),
            Duration::minutes(10)
        );
    }
}
