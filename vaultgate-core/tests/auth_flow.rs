//! End-to-end flows through the auth service and request-security pipeline
//! against an in-memory account repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use vaultgate_core::{
    error::{AuthError, Error, StorageError},
    events::SecurityEventType,
    lockout::{LockoutConfig, LockoutState},
    password::HasherConfig,
    rate_limit::RateLimitConfig,
    repositories::AccountRepository,
    services::{AuthService, ClientMeta},
    session::SessionConfig,
    Account, AccountId, ClientInfo, Decision, Fingerprint, NewAccount, PasswordHasher,
    PasswordRecord, RateLimiter, SecurityEventLog, SessionStore,
};

#[derive(Default)]
struct MemoryAccountRepository {
    accounts: Mutex<HashMap<String, Account>>,
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error> {
        Ok(self.accounts.lock().await.get(email).cloned())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        Ok(self
            .accounts
            .lock()
            .await
            .values()
            .find(|a| &a.id == id)
            .cloned())
    }

    async fn create(&self, new: NewAccount) -> Result<Account, Error> {
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(&new.email) {
            return Err(StorageError::Constraint("duplicate email".into()).into());
        }
        let now = Utc::now();
        let account = Account {
            id: AccountId::new_random(),
            email: new.email.clone(),
            name: new.name,
            password: new.password,
            lockout: LockoutState::new(now),
            created_at: now,
            updated_at: now,
        };
        accounts.insert(new.email, account.clone());
        Ok(account)
    }

    async fn update_lockout_state(
        &self,
        id: &AccountId,
        state: &LockoutState,
    ) -> Result<(), Error> {
        let mut accounts = self.accounts.lock().await;
        for account in accounts.values_mut() {
            if &account.id == id {
                account.lockout = state.clone();
            }
        }
        Ok(())
    }

    async fn update_password_record(
        &self,
        id: &AccountId,
        record: &PasswordRecord,
    ) -> Result<(), Error> {
        let mut accounts = self.accounts.lock().await;
        for account in accounts.values_mut() {
            if &account.id == id {
                account.password = record.clone();
            }
        }
        Ok(())
    }
}

fn build_service() -> (AuthService<MemoryAccountRepository>, Arc<SecurityEventLog>) {
    let events = Arc::new(SecurityEventLog::default());
    let service = AuthService::new(
        Arc::new(MemoryAccountRepository::default()),
        Arc::new(PasswordHasher::new(
            "integration-pepper",
            HasherConfig::insecure_fast(),
        )),
        LockoutConfig::default(),
        Arc::new(SessionStore::new(SessionConfig::default())),
        Arc::clone(&events),
    );
    (service, events)
}

fn meta() -> ClientMeta {
    ClientMeta {
        ip: Some("203.0.113.7".into()),
        user_agent: Some("Mozilla/5.0".into()),
        request_id: Some("req_test".into()),
    }
}

/// Scenario A: registration with a strong password succeeds and the account
/// surfaced to the caller carries no credential material in serialized form
/// beyond the password record the repository owns.
#[tokio::test]
async fn registration_with_strong_password() {
    let (service, events) = build_service();

    let account = service
        .register(
            "alice@example.com",
            Some("Alice".into()),
            "Xy9$mK@2pQ7#vL4!nR8",
            &meta(),
        )
        .await
        .expect("registration should succeed");

    assert_eq!(account.email, "alice@example.com");
    assert_eq!(account.name.as_deref(), Some("Alice"));
    assert_ne!(account.password.current_hash, "Xy9$mK@2pQ7#vL4!nR8");
    assert_eq!(account.password.history.len(), 1);

    let created = events.by_type(SecurityEventType::AccountCreated, 10);
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].actor_ip.as_deref(), Some("203.0.113.7"));
}

/// Scenario B: five consecutive failures lock the account; the sixth attempt
/// with the correct password still gets a locked response, not a login.
#[tokio::test]
async fn lockout_blocks_correct_password() {
    let (service, events) = build_service();
    service
        .register("bob@example.com", None, "Xy9$mK@2pQ7#vL4!nR8", &meta())
        .await
        .unwrap();

    for _ in 0..5 {
        let result = service
            .login("bob@example.com", "Wrong-pass-1!", &meta())
            .await;
        assert!(result.is_err());
    }

    let result = service
        .login("bob@example.com", "Xy9$mK@2pQ7#vL4!nR8", &meta())
        .await;
    match result.unwrap_err() {
        Error::Auth(AuthError::AccountLocked { remaining_seconds }) => {
            assert!(remaining_seconds > 0);
            assert!(remaining_seconds <= 15 * 60);
        }
        e => panic!("expected AccountLocked, got {e:?}"),
    }

    assert_eq!(events.by_type(SecurityEventType::AccountLocked, 10).len(), 1);
    assert!(events.by_type(SecurityEventType::LoginFailed, 10).len() >= 4);
}

/// Scenario C: the 101st request from one fingerprint inside the general
/// window is denied with a positive retry-after.
#[tokio::test]
async fn general_rate_limit_denies_101st_request() {
    let limiter = RateLimiter::new(RateLimitConfig::general());
    let key = Fingerprint::derive(&ClientInfo {
        ip: "198.51.100.9".into(),
        user_agent: "Mozilla/5.0".into(),
        accept_language: "en-US".into(),
        accept_encoding: "gzip".into(),
        connection: "keep-alive".into(),
    });
    let now = Utc::now();

    for _ in 0..100 {
        assert!(limiter.check_at(&key, now).is_allowed());
    }

    let decision = limiter.check_at(&key, now);
    match decision {
        Decision::Deny { .. } => {
            assert!(decision.retry_after_seconds().unwrap() > 0);
        }
        Decision::Allow => panic!("101st request should be denied"),
    }
}

/// Auth endpoints sit behind both limiters; exhausting the auth pool denies
/// the request even though the general pool still has budget.
#[tokio::test]
async fn auth_requests_must_pass_both_limiters() {
    let general = RateLimiter::new(RateLimitConfig::general());
    let auth = RateLimiter::new(RateLimitConfig::auth());
    let key = Fingerprint::derive(&ClientInfo {
        ip: "198.51.100.10".into(),
        ..Default::default()
    });
    let now = Utc::now();

    for _ in 0..20 {
        assert!(general.check_at(&key, now).is_allowed());
        assert!(auth.check_at(&key, now).is_allowed());
    }

    assert!(general.check_at(&key, now).is_allowed());
    assert!(!auth.check_at(&key, now).is_allowed());
}

/// Full lifecycle: register, login, rotate the password, re-login with the
/// new credential, and confirm the session store hands out fresh identities.
#[tokio::test]
async fn full_account_lifecycle() {
    let (service, _) = build_service();

    let account = service
        .register("carol@example.com", None, "Xy9$mK@2pQ7#vL4!nR8", &meta())
        .await
        .unwrap();

    let (_, session) = service
        .login("carol@example.com", "Xy9$mK@2pQ7#vL4!nR8", &meta())
        .await
        .unwrap();

    service
        .change_password(
            &account.id,
            "Xy9$mK@2pQ7#vL4!nR8",
            "Qw8#Zr3$Tn6@Vb1!Mk5x",
            &meta(),
        )
        .await
        .unwrap();

    // Session regeneration after a sensitive operation: the old token dies.
    let fresh = service.sessions().regenerate(&session.token).unwrap();
    assert!(service.sessions().get(&session.token).is_err());
    assert!(service.sessions().get(&fresh.token).is_ok());

    let (_, _) = service
        .login("carol@example.com", "Qw8#Zr3$Tn6@Vb1!Mk5x", &meta())
        .await
        .unwrap();
}
