//! Bounded in-memory security event log.
//!
//! Operational visibility, not an audit-of-record: events live in a ring of
//! fixed capacity, oldest evicted first, and are lost on restart. The log is
//! constructed once at startup and shared by reference.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Default ring capacity.
pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventType {
    LoginFailed,
    LoginSucceeded,
    AccountLocked,
    AccountCreated,
    PasswordChanged,
    RateLimitExceeded,
    HoneypotTriggered,
    SuspiciousRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// A single recorded event. Immutable once appended.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityEvent {
    pub event_type: SecurityEventType,
    pub severity: Severity,
    pub actor_ip: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub details: HashMap<String, String>,
}

impl SecurityEvent {
    pub fn new(event_type: SecurityEventType, severity: Severity) -> Self {
        Self {
            event_type,
            severity,
            actor_ip: None,
            user_agent: None,
            request_id: None,
            timestamp: Utc::now(),
            details: HashMap::new(),
        }
    }

    pub fn actor_ip(mut self, ip: impl Into<String>) -> Self {
        self.actor_ip = Some(ip.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Append-only bounded event log with FIFO eviction.
pub struct SecurityEventLog {
    capacity: usize,
    events: RwLock<VecDeque<SecurityEvent>>,
}

impl Default for SecurityEventLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SecurityEventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append an event, evicting the oldest entry at capacity.
    pub fn log(&self, event: SecurityEvent) {
        tracing::debug!(
            event_type = ?event.event_type,
            severity = ?event.severity,
            actor_ip = event.actor_ip.as_deref(),
            "security event"
        );

        // A panic in another holder leaves the ring structurally valid, so
        // recover the guard instead of propagating the poison.
        let mut events = self.events.write().unwrap_or_else(|e| e.into_inner());
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// The most recent `limit` events, in insertion order (most-recent-last).
    pub fn recent(&self, limit: usize) -> Vec<SecurityEvent> {
        self.query(limit, |_| true)
    }

    /// The most recent `limit` events of the given type.
    pub fn by_type(&self, event_type: SecurityEventType, limit: usize) -> Vec<SecurityEvent> {
        self.query(limit, |e| e.event_type == event_type)
    }

    /// The most recent `limit` events attributed to the given IP.
    pub fn by_actor(&self, ip: &str, limit: usize) -> Vec<SecurityEvent> {
        self.query(limit, |e| e.actor_ip.as_deref() == Some(ip))
    }

    pub fn len(&self) -> usize {
        self.events
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn query(&self, limit: usize, predicate: impl Fn(&SecurityEvent) -> bool) -> Vec<SecurityEvent> {
        let events = self.events.read().unwrap_or_else(|e| e.into_inner());
        let mut matched: Vec<SecurityEvent> = events
            .iter()
            .rev()
            .filter(|e| predicate(e))
            .take(limit)
            .cloned()
            .collect();
        matched.reverse();
        matched
    }
}
