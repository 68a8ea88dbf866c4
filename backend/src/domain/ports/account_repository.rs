//! Port abstraction for account persistence adapters.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::user::{Account, Username};

/// Persistence errors raised by account repository adapters.
///
/// The duplicate variants surface the storage unique constraints on username
/// and email; they arbitrate signup races the application-level checks can
/// only narrow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountPersistenceError {
    /// Repository connection could not be established.
    #[error("account repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("account repository query failed: {message}")]
    Query { message: String },
    /// Insert violated the unique constraint on username.
    #[error("username is already taken")]
    DuplicateUsername,
    /// Insert violated the unique constraint on email.
    #[error("email is already taken")]
    DuplicateEmail,
}

impl AccountPersistenceError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for account storage.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account record.
    async fn insert(&self, account: &Account) -> Result<(), AccountPersistenceError>;

    /// Persist changes to an existing account record.
    async fn update(&self, account: &Account) -> Result<(), AccountPersistenceError>;

    /// Remove an account by username, reporting whether a row existed.
    async fn delete_by_username(
        &self,
        username: &Username,
    ) -> Result<bool, AccountPersistenceError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AccountPersistenceError>;

    /// Fetch an account by raw username string.
    ///
    /// Accepts unvalidated input so the token-exchange path can report an
    /// unknown username rather than a validation failure.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AccountPersistenceError>;

    /// Fetch an account by raw email string.
    async fn find_by_email(&self, email: &str)
    -> Result<Option<Account>, AccountPersistenceError>;

    /// List all accounts ordered by username.
    async fn list(&self) -> Result<Vec<Account>, AccountPersistenceError>;
}

/// In-memory account repository used by tests and database-less deployments.
///
/// Enforces the same username/email uniqueness as the SQL schema so the
/// duplicate error paths stay exercisable without PostgreSQL.
#[derive(Debug, Default)]
pub struct FixtureAccountRepository {
    state: Mutex<Vec<Account>>,
}

impl FixtureAccountRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Account>> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl AccountRepository for FixtureAccountRepository {
    async fn insert(&self, account: &Account) -> Result<(), AccountPersistenceError> {
        let mut state = self.lock();
        if state.iter().any(|a| a.username == account.username) {
            return Err(AccountPersistenceError::DuplicateUsername);
        }
        if state.iter().any(|a| a.email == account.email) {
            return Err(AccountPersistenceError::DuplicateEmail);
        }
        state.push(account.clone());
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), AccountPersistenceError> {
        let mut state = self.lock();
        if state
            .iter()
            .any(|a| a.id != account.id && a.username == account.username)
        {
            return Err(AccountPersistenceError::DuplicateUsername);
        }
        if state
            .iter()
            .any(|a| a.id != account.id && a.email == account.email)
        {
            return Err(AccountPersistenceError::DuplicateEmail);
        }
        match state.iter_mut().find(|a| a.id == account.id) {
            Some(slot) => {
                *slot = account.clone();
                Ok(())
            }
            None => Err(AccountPersistenceError::query("account does not exist")),
        }
    }

    async fn delete_by_username(
        &self,
        username: &Username,
    ) -> Result<bool, AccountPersistenceError> {
        let mut state = self.lock();
        let before = state.len();
        state.retain(|a| a.username != *username);
        Ok(state.len() < before)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AccountPersistenceError> {
        Ok(self.lock().iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AccountPersistenceError> {
        Ok(self
            .lock()
            .iter()
            .find(|a| a.username.as_ref() == username)
            .cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Account>, AccountPersistenceError> {
        Ok(self
            .lock()
            .iter()
            .find(|a| a.email.as_ref() == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Account>, AccountPersistenceError> {
        let mut accounts = self.lock().clone();
        accounts.sort_by(|a, b| a.username.as_ref().cmp(b.username.as_ref()));
        Ok(accounts)
    }
}
