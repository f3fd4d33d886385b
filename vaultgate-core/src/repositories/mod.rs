//! Repository trait for the persistence collaborator.
//!
//! The core never talks to a database directly; an application wires in an
//! implementation of [`AccountRepository`] backed by whatever store it uses.
//! Lockout and password updates are last-write-wins: the core does not
//! implement compare-and-swap, so concurrent logins against one account may
//! race on the failed-attempt counter. Accepted for this scope.

use async_trait::async_trait;

use crate::{
    account::{Account, AccountId, NewAccount, PasswordRecord},
    error::Error,
    lockout::LockoutState,
};

/// Storage operations for accounts and their security state.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Look up an account by its credential key (email).
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error>;

    /// Look up an account by ID.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error>;

    /// Create an account.
    ///
    /// A duplicate credential key must be rejected with
    /// [`StorageError::Constraint`](crate::error::StorageError::Constraint)
    /// so the caller can surface a conflict.
    async fn create(&self, account: NewAccount) -> Result<Account, Error>;

    /// Persist an updated lockout state for an account.
    async fn update_lockout_state(
        &self,
        id: &AccountId,
        state: &LockoutState,
    ) -> Result<(), Error>;

    /// Persist an updated password record for an account.
    async fn update_password_record(
        &self,
        id: &AccountId,
        record: &PasswordRecord,
    ) -> Result<(), Error>;
}
