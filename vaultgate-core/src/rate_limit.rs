//! Fixed-window rate limiting keyed by client fingerprint.
//!
//! Each key maps to a counter and a window reset time. Expired windows are
//! reset lazily on the next access rather than swept by a background task;
//! entries self-expire in effect by being overwritten. The read-modify-write
//! on a window happens under the map shard lock, so concurrent requests for
//! the same fingerprint cannot undercount.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::fingerprint::Fingerprint;

/// Window length and request budget for one limiter instance.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    /// General pool: 100 requests per 15 minutes.
    pub fn general() -> Self {
        Self {
            max_requests: 100,
            window: Duration::minutes(15),
        }
    }

    /// Authentication endpoints: 20 requests per minute. Auth requests must
    /// pass this limiter in addition to the general one.
    pub fn auth() -> Self {
        Self {
            max_requests: 20,
            window: Duration::minutes(1),
        }
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny {
        /// Time until the offending window resets.
        retry_after: Duration,
    },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Seconds to wait before retrying; `None` when allowed. Rounded up so a
    /// client never retries inside the same window.
    pub fn retry_after_seconds(&self) -> Option<i64> {
        match self {
            Decision::Allow => None,
            Decision::Deny { retry_after } => {
                let millis = retry_after.num_milliseconds().max(0);
                Some((millis + 999) / 1000)
            }
        }
    }
}

#[derive(Debug)]
struct RateWindow {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Shared fixed-window counter map. Constructed once at startup and shared
/// by reference across request handlers.
pub struct RateLimiter {
    windows: DashMap<Fingerprint, RateWindow>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check and count a request for the given fingerprint.
    pub fn check(&self, key: &Fingerprint) -> Decision {
        self.check_at(key, Utc::now())
    }

    /// Clock-injected variant of [`check`](Self::check).
    pub fn check_at(&self, key: &Fingerprint, now: DateTime<Utc>) -> Decision {
        let mut window = self
            .windows
            .entry(key.clone())
            .or_insert_with(|| RateWindow {
                count: 0,
                reset_at: now + self.config.window,
            });

        if now > window.reset_at {
            window.count = 1;
            window.reset_at = now + self.config.window;
            return Decision::Allow;
        }

        if window.count < self.config.max_requests {
            window.count += 1;
            Decision::Allow
        } else {
            tracing::warn!(
                fingerprint = %key,
                count = window.count,
                "rate limit exceeded"
            );
            Decision::Deny {
                retry_after: window.reset_at - now,
            }
        }
    }

    /// Number of tracked windows, expired or not.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}
