//! Core security components for the vaultgate banking demo.
//!
//! This crate implements the account-security subsystem (peppered password
//! hashing, strength scoring, password history, account lockout) and the
//! request-security pipeline (client fingerprinting, fixed-window rate
//! limiting, honeypot detection, bounded security event log), composed by the
//! [`services::AuthService`] orchestrator.
//!
//! Persistence and the HTTP framework are external collaborators: accounts
//! are reached through the [`repositories::AccountRepository`] trait, and the
//! HTTP surface lives in the companion `vaultgate-axum` crate.

pub mod account;
pub mod error;
pub mod events;
pub mod fingerprint;
pub mod honeypot;
pub mod lockout;
pub mod password;
pub mod rate_limit;
pub mod repositories;
pub mod services;
pub mod session;
pub mod validation;

pub use account::{Account, AccountId, NewAccount, PasswordRecord};
pub use error::Error;
pub use events::{SecurityEvent, SecurityEventLog, SecurityEventType, Severity};
pub use fingerprint::{ClientInfo, Fingerprint};
pub use honeypot::HoneypotDetector;
pub use lockout::{LockoutConfig, LockoutState};
pub use password::{PasswordHasher, PasswordHistory, StrengthReport};
pub use rate_limit::{Decision, RateLimitConfig, RateLimiter};
pub use session::{Session, SessionStore, SessionToken};
