//! Diesel-backed `AccountRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AccountPersistenceError, AccountRepository};
use crate::domain::user::{Account, EmailAddress, Role, Username};

use super::models::{AccountRow, AccountUpdate, NewAccountRow};
use super::pool::DbPool;
use super::schema::accounts;

/// Diesel-backed account repository.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(err: super::pool::PoolError) -> AccountPersistenceError {
    AccountPersistenceError::connection(err.to_string())
}

fn map_diesel_error(err: diesel::result::Error) -> AccountPersistenceError {
    if let diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &err {
        return match info.constraint_name() {
            Some("accounts_username_key") => AccountPersistenceError::DuplicateUsername,
            Some("accounts_email_key") => AccountPersistenceError::DuplicateEmail,
            _ => AccountPersistenceError::query(err.to_string()),
        };
    }
    AccountPersistenceError::query(err.to_string())
}

fn row_to_account(row: AccountRow) -> Result<Account, AccountPersistenceError> {
    let username = Username::new(row.username)
        .map_err(|err| AccountPersistenceError::query(format!("stored username invalid: {err}")))?;
    let email = EmailAddress::new(row.email)
        .map_err(|err| AccountPersistenceError::query(format!("stored email invalid: {err}")))?;
    let role: Role = row
        .role
        .parse()
        .map_err(|err| AccountPersistenceError::query(format!("stored role invalid: {err}")))?;
    Ok(Account {
        id: row.id,
        username,
        email,
        role,
        is_superuser: row.is_superuser,
        first_name: row.first_name,
        last_name: row.last_name,
        bio: row.bio,
        code_issued_at: row.code_issued_at,
    })
}

fn account_to_insert(account: &Account) -> NewAccountRow<'_> {
    NewAccountRow {
        id: account.id,
        username: account.username.as_ref(),
        email: account.email.as_ref(),
        role: account.role.as_str(),
        is_superuser: account.is_superuser,
        first_name: account.first_name.as_deref(),
        last_name: account.last_name.as_deref(),
        bio: account.bio.as_deref(),
        code_issued_at: account.code_issued_at,
    }
}

fn account_to_update(account: &Account) -> AccountUpdate<'_> {
    AccountUpdate {
        username: account.username.as_ref(),
        email: account.email.as_ref(),
        role: account.role.as_str(),
        is_superuser: account.is_superuser,
        first_name: account.first_name.as_deref(),
        last_name: account.last_name.as_deref(),
        bio: account.bio.as_deref(),
        code_issued_at: account.code_issued_at,
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn insert(&self, account: &Account) -> Result<(), AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(accounts::table)
            .values(account_to_insert(account))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(accounts::table.find(account.id))
            .set(account_to_update(account))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(AccountPersistenceError::query("account does not exist"));
        }
        Ok(())
    }

    async fn delete_by_username(
        &self,
        username: &Username,
    ) -> Result<bool, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted =
            diesel::delete(accounts::table.filter(accounts::username.eq(username.as_ref())))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = accounts::table
            .find(id)
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = accounts::table
            .filter(accounts::username.eq(username))
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Account>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = accounts::table
            .filter(accounts::email.eq(email))
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn list(&self) -> Result<Vec<Account>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = accounts::table
            .order(accounts::username.asc())
            .select(AccountRow::as_select())
            .load::<AccountRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_account).collect()
    }
}
