//! Use-case service for account administration and the self-scoped resource.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;

use crate::domain::policy::{Actor, authorize_account_management, authorize_self_access};
use crate::domain::ports::AccountRepository;
use crate::domain::signup::map_account_persistence_error;
use crate::domain::user::{
    Account, AccountValidationError, EmailAddress, Role, Username, validate_profile_name,
};
use crate::domain::{ApiResult, Error};

/// Payload for the admin account-creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDraft {
    pub username: String,
    pub email: String,
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

/// Partial update for an account.
///
/// `role` is only honoured on the admin path; the self-scoped update resets
/// it to the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

/// Use-case service over account storage.
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    /// Wire the service from its collaborators.
    pub fn new(accounts: Arc<dyn AccountRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { accounts, clock }
    }

    /// List every account (admin only).
    pub async fn list(&self, actor: &Actor) -> ApiResult<Vec<Account>> {
        authorize_account_management(actor)?;
        self.accounts
            .list()
            .await
            .map_err(map_account_persistence_error)
    }

    /// Fetch one account by username (admin only).
    pub async fn get(&self, actor: &Actor, username: &str) -> ApiResult<Account> {
        authorize_account_management(actor)?;
        self.find_required(username).await
    }

    /// Create an account directly (admin only).
    pub async fn create(&self, actor: &Actor, draft: AccountDraft) -> ApiResult<Account> {
        authorize_account_management(actor)?;
        let username = Username::new(draft.username).map_err(map_validation_error)?;
        let email = EmailAddress::new(draft.email).map_err(map_validation_error)?;

        if self
            .accounts
            .find_by_username(username.as_ref())
            .await
            .map_err(map_account_persistence_error)?
            .is_some()
        {
            return Err(duplicate_field("username"));
        }
        if self
            .accounts
            .find_by_email(email.as_ref())
            .await
            .map_err(map_account_persistence_error)?
            .is_some()
        {
            return Err(duplicate_field("email"));
        }

        let mut account = Account::new(username, email, self.clock.utc());
        if let Some(role) = draft.role {
            account.role = role;
        }
        apply_profile_fields(
            &mut account,
            draft.first_name,
            draft.last_name,
            draft.bio,
        )?;
        self.accounts
            .insert(&account)
            .await
            .map_err(map_account_persistence_error)?;
        Ok(account)
    }

    /// Partially update an account by username (admin only).
    pub async fn update(
        &self,
        actor: &Actor,
        username: &str,
        patch: AccountPatch,
    ) -> ApiResult<Account> {
        authorize_account_management(actor)?;
        let mut account = self.find_required(username).await?;
        apply_patch(&mut account, patch, RoleHandling::Honour)?;
        self.accounts
            .update(&account)
            .await
            .map_err(map_account_persistence_error)?;
        Ok(account)
    }

    /// Delete an account by username (admin only).
    pub async fn delete(&self, actor: &Actor, username: &str) -> ApiResult<()> {
        authorize_account_management(actor)?;
        let account = self.find_required(username).await?;
        let removed = self
            .accounts
            .delete_by_username(&account.username)
            .await
            .map_err(map_account_persistence_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("no account with this username"))
        }
    }

    /// Fetch the requesting account's own record.
    pub fn get_self<'a>(&self, actor: &'a Actor) -> ApiResult<&'a Account> {
        authorize_self_access(actor)
    }

    /// Partially update the requesting account's own record.
    ///
    /// Any `role` field in the patch is discarded: the role is force-reset to
    /// its stored value, so accounts cannot escalate themselves.
    pub async fn update_self(&self, actor: &Actor, patch: AccountPatch) -> ApiResult<Account> {
        let current = authorize_self_access(actor)?;
        let mut account = current.clone();
        apply_patch(&mut account, patch, RoleHandling::Reset)?;
        account.role = current.role;
        self.accounts
            .update(&account)
            .await
            .map_err(map_account_persistence_error)?;
        Ok(account)
    }

    async fn find_required(&self, username: &str) -> ApiResult<Account> {
        self.accounts
            .find_by_username(username)
            .await
            .map_err(map_account_persistence_error)?
            .ok_or_else(|| Error::not_found("no account with this username"))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RoleHandling {
    Honour,
    Reset,
}

fn apply_patch(
    account: &mut Account,
    patch: AccountPatch,
    role_handling: RoleHandling,
) -> ApiResult<()> {
    if let Some(username) = patch.username {
        account.username = Username::new(username).map_err(map_validation_error)?;
    }
    if let Some(email) = patch.email {
        account.email = EmailAddress::new(email).map_err(map_validation_error)?;
    }
    if let Some(role) = patch.role {
        if role_handling == RoleHandling::Honour {
            account.role = role;
        }
    }
    apply_profile_fields(account, patch.first_name, patch.last_name, patch.bio)
}

fn apply_profile_fields(
    account: &mut Account,
    first_name: Option<String>,
    last_name: Option<String>,
    bio: Option<String>,
) -> ApiResult<()> {
    if let Some(value) = first_name {
        validate_profile_name(&value).map_err(map_validation_error)?;
        account.first_name = Some(value);
    }
    if let Some(value) = last_name {
        validate_profile_name(&value).map_err(map_validation_error)?;
        account.last_name = Some(value);
    }
    if let Some(value) = bio {
        account.bio = Some(value);
    }
    Ok(())
}

fn map_validation_error(err: AccountValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

fn duplicate_field(field: &str) -> Error {
    Error::invalid_request("an account with this value already exists")
        .with_details(json!({ "field": field, "code": "duplicate" }))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use chrono::{DateTime, Local, TimeZone, Utc};
    use mockable::Clock;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::FixtureAccountRepository;

    struct FixtureClock {
        utc_now: DateTime<Utc>,
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc_now.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.utc_now
        }
    }

    fn fixture_clock() -> Arc<dyn Clock> {
        Arc::new(FixtureClock {
            utc_now: Utc
                .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
                .single()
                .expect("valid fixture timestamp"),
        })
    }

    fn service() -> (Arc<FixtureAccountRepository>, AccountService) {
        let accounts = Arc::new(FixtureAccountRepository::new());
        let svc = AccountService::new(accounts.clone(), fixture_clock());
        (accounts, svc)
    }

    fn admin_actor() -> Actor {
        let mut account = Account::new(
            Username::new("root").expect("valid username"),
            EmailAddress::new("root@example.org").expect("valid email"),
            Utc::now(),
        );
        account.role = Role::Admin;
        Actor::Authenticated(account)
    }

    fn user_actor(account: Account) -> Actor {
        Actor::Authenticated(account)
    }

    fn draft(username: &str, email: &str) -> AccountDraft {
        AccountDraft {
            username: username.to_owned(),
            email: email.to_owned(),
            role: None,
            first_name: None,
            last_name: None,
            bio: None,
        }
    }

    #[tokio::test]
    async fn admin_creates_and_lists_accounts() {
        let (_, svc) = service();
        let admin = admin_actor();
        svc.create(&admin, draft("alice", "alice@example.org"))
            .await
            .expect("create should succeed");
        svc.create(&admin, draft("bob", "bob@example.org"))
            .await
            .expect("create should succeed");

        let listed = svc.list(&admin).await.expect("list should succeed");
        let usernames: Vec<&str> = listed.iter().map(|a| a.username.as_ref()).collect();
        assert_eq!(usernames, vec!["alice", "bob"]);
    }

    #[rstest]
    #[case("alice", "elsewhere@example.org", "username")]
    #[case("carol", "alice@example.org", "email")]
    #[tokio::test]
    async fn admin_create_rejects_duplicate_identity_fields(
        #[case] username: &str,
        #[case] email: &str,
        #[case] field: &str,
    ) {
        let (_, svc) = service();
        let admin = admin_actor();
        svc.create(&admin, draft("alice", "alice@example.org"))
            .await
            .expect("create should succeed");

        let err = svc
            .create(&admin, draft(username, email))
            .await
            .expect_err("duplicate should fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.details().expect("details")["field"], field);
    }

    #[tokio::test]
    async fn admin_create_rejects_the_reserved_username() {
        let (_, svc) = service();
        let err = svc
            .create(&admin_actor(), draft("me", "me@example.org"))
            .await
            .expect_err("reserved username should fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn non_admins_cannot_touch_the_collection() {
        let (_, svc) = service();
        let admin = admin_actor();
        let created = svc
            .create(&admin, draft("alice", "alice@example.org"))
            .await
            .expect("create should succeed");

        let actor = user_actor(created);
        assert_eq!(
            svc.list(&actor).await.expect_err("list should be denied").code(),
            ErrorCode::Forbidden
        );
        assert_eq!(
            svc.get(&actor, "alice")
                .await
                .expect_err("get should be denied")
                .code(),
            ErrorCode::Forbidden
        );
        assert_eq!(
            svc.delete(&actor, "alice")
                .await
                .expect_err("delete should be denied")
                .code(),
            ErrorCode::Forbidden
        );
    }

    #[tokio::test]
    async fn admin_update_changes_roles() {
        let (accounts, svc) = service();
        let admin = admin_actor();
        svc.create(&admin, draft("alice", "alice@example.org"))
            .await
            .expect("create should succeed");

        let patch = AccountPatch {
            role: Some(Role::Moderator),
            ..AccountPatch::default()
        };
        let updated = svc
            .update(&admin, "alice", patch)
            .await
            .expect("update should succeed");
        assert_eq!(updated.role, Role::Moderator);

        let stored = accounts
            .find_by_username("alice")
            .await
            .expect("lookup should succeed")
            .expect("account should exist");
        assert_eq!(stored.role, Role::Moderator);
    }

    #[tokio::test]
    async fn self_update_ignores_the_role_field() {
        let (accounts, svc) = service();
        let admin = admin_actor();
        let created = svc
            .create(&admin, draft("alice", "alice@example.org"))
            .await
            .expect("create should succeed");
        let role_before = created.role;

        let actor = user_actor(created);
        let patch = AccountPatch {
            role: Some(Role::Admin),
            bio: Some("hill walker".to_owned()),
            ..AccountPatch::default()
        };
        let updated = svc
            .update_self(&actor, patch)
            .await
            .expect("self update should succeed");
        assert_eq!(updated.role, role_before, "role must be force-reset");
        assert_eq!(updated.bio.as_deref(), Some("hill walker"));

        let stored = accounts
            .find_by_username("alice")
            .await
            .expect("lookup should succeed")
            .expect("account should exist");
        assert_eq!(stored.role, role_before);
    }

    #[tokio::test]
    async fn self_update_cannot_claim_the_reserved_username() {
        let (_, svc) = service();
        let admin = admin_actor();
        let created = svc
            .create(&admin, draft("alice", "alice@example.org"))
            .await
            .expect("create should succeed");

        let actor = user_actor(created);
        let patch = AccountPatch {
            username: Some("me".to_owned()),
            ..AccountPatch::default()
        };
        let err = svc
            .update_self(&actor, patch)
            .await
            .expect_err("reserved username should fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn missing_accounts_surface_as_not_found() {
        let (_, svc) = service();
        let admin = admin_actor();
        assert_eq!(
            svc.get(&admin, "ghost")
                .await
                .expect_err("missing account should 404")
                .code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            svc.delete(&admin, "ghost")
                .await
                .expect_err("missing account should 404")
                .code(),
            ErrorCode::NotFound
        );
    }
}
