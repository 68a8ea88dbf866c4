//! Authorization policies.
//!
//! Pure decision functions over an explicit [`Actor`] value. Handlers build
//! the actor once per request from the authenticated identity and pass it to
//! every policy and service call; nothing here reads ambient state.
//!
//! Denials are deliberately uniform: the messages never reveal which
//! sub-condition (role, ownership, superuser flag) failed.

use uuid::Uuid;

use crate::domain::user::Account;
use crate::domain::{ApiResult, Error};

/// Requesting identity for a single request.
#[derive(Debug, Clone)]
pub enum Actor {
    /// No credential was presented, or it failed verification upstream.
    Anonymous,
    /// Verified account snapshot loaded for this request.
    Authenticated(Account),
}

impl Actor {
    /// Account backing this actor, when authenticated.
    pub fn account(&self) -> Option<&Account> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(account) => Some(account),
        }
    }

    /// Require an authenticated account or fail with `401 Unauthorized`.
    pub fn require_account(&self) -> ApiResult<&Account> {
        self.account()
            .ok_or_else(|| Error::unauthorized("authentication required"))
    }
}

fn permission_denied() -> Error {
    Error::forbidden("you do not have permission to perform this action")
}

/// Collection and object reads on the catalogue and contributions are public.
///
/// Kept as an explicit decision point so routing stays deny-by-default: a
/// handler that forgets to call any policy reads as unfinished, not as open.
pub fn authorize_read(_actor: &Actor) -> ApiResult<()> {
    Ok(())
}

/// Creating or deleting categories, genres, and titles.
///
/// Requires an authenticated admin or superuser.
pub fn authorize_catalogue_write(actor: &Actor) -> ApiResult<()> {
    let account = actor.require_account()?;
    if account.can_write_catalogue() {
        return Ok(());
    }
    Err(permission_denied())
}

/// Mutating an existing review or comment.
///
/// Authors may edit their own contributions; moderators, admins, and
/// superusers may edit anyone's.
pub fn authorize_contribution_edit(actor: &Actor, author_id: Uuid) -> ApiResult<()> {
    let account = actor.require_account()?;
    if account.can_moderate() || account.id == author_id {
        return Ok(());
    }
    Err(permission_denied())
}

/// Creating a review or comment requires any authenticated account.
pub fn authorize_contribution_create(actor: &Actor) -> ApiResult<()> {
    actor.require_account().map(|_| ())
}

/// Administering the accounts collection.
pub fn authorize_account_management(actor: &Actor) -> ApiResult<()> {
    let account = actor.require_account()?;
    if account.can_manage_accounts() {
        return Ok(());
    }
    Err(permission_denied())
}

/// Reading or updating the self-scoped `me` resource.
///
/// Any authenticated account owns exactly its own record; the role reset on
/// self-update is enforced by the account service, not here.
pub fn authorize_self_access(actor: &Actor) -> ApiResult<&Account> {
    actor.require_account()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::domain::user::{EmailAddress, Role, Username};
    use crate::domain::ErrorCode;

    fn account_with(role: Role, is_superuser: bool) -> Account {
        let issued = Utc
            .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp");
        let mut account = Account::new(
            Username::new("critic").expect("valid username"),
            EmailAddress::new("critic@example.org").expect("valid email"),
            issued,
        );
        account.role = role;
        account.is_superuser = is_superuser;
        account
    }

    fn actor_with(role: Role, is_superuser: bool) -> Actor {
        Actor::Authenticated(account_with(role, is_superuser))
    }

    #[test]
    fn reads_are_allowed_for_anonymous_requests() {
        assert!(authorize_read(&Actor::Anonymous).is_ok());
    }

    #[rstest]
    #[case(Actor::Anonymous, ErrorCode::Unauthorized)]
    #[case(actor_with(Role::User, false), ErrorCode::Forbidden)]
    #[case(actor_with(Role::Moderator, false), ErrorCode::Forbidden)]
    fn catalogue_writes_reject_everyone_below_admin(
        #[case] actor: Actor,
        #[case] expected: ErrorCode,
    ) {
        let err = authorize_catalogue_write(&actor).expect_err("write should be denied");
        assert_eq!(err.code(), expected);
    }

    #[rstest]
    #[case(actor_with(Role::Admin, false))]
    #[case(actor_with(Role::User, true))]
    fn catalogue_writes_allow_admin_and_superuser(#[case] actor: Actor) {
        assert!(authorize_catalogue_write(&actor).is_ok());
    }

    #[test]
    fn contribution_edit_allows_the_author() {
        let account = account_with(Role::User, false);
        let author_id = account.id;
        let actor = Actor::Authenticated(account);
        assert!(authorize_contribution_edit(&actor, author_id).is_ok());
    }

    #[rstest]
    #[case(Role::Moderator, false)]
    #[case(Role::Admin, false)]
    #[case(Role::User, true)]
    fn contribution_edit_allows_moderation_roles_over_foreign_content(
        #[case] role: Role,
        #[case] is_superuser: bool,
    ) {
        let actor = actor_with(role, is_superuser);
        assert!(authorize_contribution_edit(&actor, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn contribution_edit_denies_unrelated_users_without_leaking_the_reason() {
        let actor = actor_with(Role::User, false);
        let err = authorize_contribution_edit(&actor, Uuid::new_v4())
            .expect_err("foreign edit should be denied");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(
            err.message(),
            "you do not have permission to perform this action"
        );
    }

    #[test]
    fn contribution_create_requires_authentication() {
        let err = authorize_contribution_create(&Actor::Anonymous)
            .expect_err("anonymous create should be denied");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert!(authorize_contribution_create(&actor_with(Role::User, false)).is_ok());
    }

    #[rstest]
    #[case(Actor::Anonymous, ErrorCode::Unauthorized)]
    #[case(actor_with(Role::User, false), ErrorCode::Forbidden)]
    #[case(actor_with(Role::Moderator, false), ErrorCode::Forbidden)]
    fn account_management_is_admin_only(#[case] actor: Actor, #[case] expected: ErrorCode) {
        let err = authorize_account_management(&actor).expect_err("should be denied");
        assert_eq!(err.code(), expected);
    }

    #[test]
    fn self_access_requires_any_authenticated_account() {
        assert!(authorize_self_access(&Actor::Anonymous).is_err());
        let actor = actor_with(Role::User, false);
        let account = authorize_self_access(&actor).expect("owner should be allowed");
        assert_eq!(account.username.as_ref(), "critic");
    }
}
