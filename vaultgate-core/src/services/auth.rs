//! Authentication orchestration: login, registration, password change.
//!
//! Composes the hasher, strength scorer, breach denylist, password history,
//! lockout tracker, session store and event log around the account
//! repository. Failure responses are deliberately generic: a caller cannot
//! tell an unknown account from a wrong password.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    account::{Account, AccountId, NewAccount, PasswordRecord},
    error::{AuthError, CryptoError, Error, ValidationError},
    events::{SecurityEvent, SecurityEventLog, SecurityEventType, Severity},
    lockout::{LockoutConfig, LockoutState},
    password::{self, BreachList, PasswordHasher, PasswordHistory},
    repositories::AccountRepository,
    session::{Session, SessionStore, SessionToken},
    validation::{validate_email, validate_password_shape},
};

/// Request attribution carried into the security event log.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
}

/// Service for authentication operations.
///
/// Thread-safe; shared across request handlers behind an `Arc`. The slow
/// hash runs on the blocking thread pool so request tasks are not starved.
pub struct AuthService<R: AccountRepository> {
    accounts: Arc<R>,
    hasher: Arc<PasswordHasher>,
    lockout: LockoutConfig,
    breach_list: BreachList,
    sessions: Arc<SessionStore>,
    events: Arc<SecurityEventLog>,
}

impl<R: AccountRepository> AuthService<R> {
    pub fn new(
        accounts: Arc<R>,
        hasher: Arc<PasswordHasher>,
        lockout: LockoutConfig,
        sessions: Arc<SessionStore>,
        events: Arc<SecurityEventLog>,
    ) -> Self {
        Self {
            accounts,
            hasher,
            lockout,
            breach_list: BreachList::new(),
            sessions,
            events,
        }
    }

    /// Replace the embedded breach denylist with an operator-supplied one.
    pub fn with_breach_list(mut self, breach_list: BreachList) -> Self {
        self.breach_list = breach_list;
        self
    }

    /// Authenticate an account and establish a fresh session.
    ///
    /// Lockout is checked before the password is verified; a locked account
    /// never reaches the hasher. On failure the lockout state is updated and
    /// persisted before the error is returned.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        meta: &ClientMeta,
    ) -> Result<(Account, Session), Error> {
        let Some(account) = self.accounts.find_by_email(email).await? else {
            self.events.log(
                self.event(SecurityEventType::LoginFailed, Severity::Medium, meta)
                    .detail("reason", "unknown_account"),
            );
            return Err(AuthError::InvalidCredentials.into());
        };

        let now = Utc::now();
        if account.lockout.is_locked(now) {
            // An attempt during lockout still counts as a failure and
            // re-arms the window, so a hammering client never runs it down.
            let state = account.lockout.record_failure(&self.lockout, now);
            self.accounts
                .update_lockout_state(&account.id, &state)
                .await?;
            self.events.log(
                self.event(SecurityEventType::LoginFailed, Severity::Medium, meta)
                    .detail("email", &account.email)
                    .detail("reason", "locked"),
            );
            return Err(AuthError::AccountLocked {
                remaining_seconds: state.remaining(now).num_seconds(),
            }
            .into());
        }

        let verified = self
            .verify_blocking(password, &account.password.current_hash)
            .await?;

        if !verified {
            let state = account.lockout.record_failure(&self.lockout, now);
            self.accounts
                .update_lockout_state(&account.id, &state)
                .await?;

            if state.is_locked(now) {
                tracing::warn!(
                    account_id = %account.id,
                    failed_attempts = state.failed_attempts,
                    "account locked after repeated failures"
                );
                self.events.log(
                    self.event(SecurityEventType::AccountLocked, Severity::High, meta)
                        .detail("email", &account.email)
                        .detail("failed_attempts", state.failed_attempts.to_string()),
                );
                return Err(AuthError::AccountLocked {
                    remaining_seconds: state.remaining(now).num_seconds(),
                }
                .into());
            }

            self.events.log(
                self.event(SecurityEventType::LoginFailed, Severity::Medium, meta)
                    .detail("email", &account.email)
                    .detail("failed_attempts", state.failed_attempts.to_string()),
            );
            return Err(AuthError::InvalidCredentials.into());
        }

        let state = LockoutState::record_success(now);
        self.accounts
            .update_lockout_state(&account.id, &state)
            .await?;

        let session = self
            .sessions
            .create(&account.id, meta.ip.clone(), meta.user_agent.clone());

        self.events.log(
            self.event(SecurityEventType::LoginSucceeded, Severity::Low, meta)
                .detail("email", &account.email),
        );

        Ok((account, session))
    }

    /// Register a new account.
    ///
    /// Gates in order: email format, password shape, strength score, breach
    /// denylist. The stored password record is seeded with the initial hash
    /// so the reuse check covers it from day one. A duplicate email
    /// propagates as a constraint violation.
    pub async fn register(
        &self,
        email: &str,
        name: Option<String>,
        password: &str,
        meta: &ClientMeta,
    ) -> Result<Account, Error> {
        validate_email(email)?;
        validate_password_shape(password)?;

        let report = password::score(password);
        if !report.is_strong {
            return Err(ValidationError::WeakPassword {
                score: report.score,
                feedback: report.feedback,
            }
            .into());
        }

        if self.breach_list.contains(password) {
            return Err(ValidationError::BreachedPassword.into());
        }

        let hash = self.hash_blocking(password).await?;
        let account = self
            .accounts
            .create(NewAccount {
                email: email.to_string(),
                name,
                password: PasswordRecord::new(hash, Utc::now()),
            })
            .await?;

        tracing::info!(account_id = %account.id, "account registered");
        self.events.log(
            self.event(SecurityEventType::AccountCreated, Severity::Low, meta)
                .detail("email", &account.email),
        );

        Ok(account)
    }

    /// Change an account's password.
    ///
    /// The current password must verify, the new one must pass the same
    /// strength and breach gates as registration, and must not match any of
    /// the retained history hashes.
    pub async fn change_password(
        &self,
        account_id: &AccountId,
        current_password: &str,
        new_password: &str,
        meta: &ClientMeta,
    ) -> Result<(), Error> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let verified = self
            .verify_blocking(current_password, &account.password.current_hash)
            .await?;
        if !verified {
            self.events.log(
                self.event(SecurityEventType::LoginFailed, Severity::Medium, meta)
                    .detail("email", &account.email)
                    .detail("reason", "password_change_bad_current"),
            );
            return Err(AuthError::InvalidCredentials.into());
        }

        validate_password_shape(new_password)?;
        let report = password::score(new_password);
        if !report.is_strong {
            return Err(ValidationError::WeakPassword {
                score: report.score,
                feedback: report.feedback,
            }
            .into());
        }
        if self.breach_list.contains(new_password) {
            return Err(ValidationError::BreachedPassword.into());
        }

        let reused = self
            .history_contains_blocking(new_password, account.password.history.clone())
            .await?;
        if reused {
            return Err(ValidationError::PasswordReuse.into());
        }

        let hash = self.hash_blocking(new_password).await?;
        let mut record = account.password.clone();
        record.rotate(hash, Utc::now());
        self.accounts
            .update_password_record(&account.id, &record)
            .await?;

        self.events.log(
            self.event(SecurityEventType::PasswordChanged, Severity::Low, meta)
                .detail("email", &account.email),
        );

        Ok(())
    }

    /// Destroy a session (logout).
    pub fn logout(&self, token: &SessionToken) {
        self.sessions.destroy(token);
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn event(
        &self,
        event_type: SecurityEventType,
        severity: Severity,
        meta: &ClientMeta,
    ) -> SecurityEvent {
        let mut event = SecurityEvent::new(event_type, severity);
        if let Some(ip) = &meta.ip {
            event = event.actor_ip(ip);
        }
        if let Some(user_agent) = &meta.user_agent {
            event = event.user_agent(user_agent);
        }
        if let Some(request_id) = &meta.request_id {
            event = event.request_id(request_id);
        }
        event
    }

    async fn hash_blocking(&self, password: &str) -> Result<String, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(join_error)?
    }

    async fn verify_blocking(&self, password: &str, digest: &str) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let digest = digest.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(join_error)
    }

    async fn history_contains_blocking(
        &self,
        password: &str,
        history: PasswordHistory,
    ) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || history.contains(&password, &hasher))
            .await
            .map_err(join_error)
    }
}

fn join_error(e: tokio::task::JoinError) -> Error {
    Error::Crypto(CryptoError::PasswordHash(format!(
        "hashing task failed: {e}"
    )))
}
