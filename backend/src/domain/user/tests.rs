//! Regression coverage for account value types and capability predicates.

use chrono::{TimeZone, Utc};
use rstest::rstest;

use super::*;

fn fixture_account(role: Role, is_superuser: bool) -> Account {
    let issued = Utc
        .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp");
    let mut account = Account::new(
        Username::new("capybara").expect("valid username"),
        EmailAddress::new("capybara@example.org").expect("valid email"),
        issued,
    );
    account.role = role;
    account.is_superuser = is_superuser;
    account
}

#[rstest]
#[case("alice")]
#[case("a.lice+review@host")]
#[case("under_score-42")]
fn username_accepts_allowed_characters(#[case] value: &str) {
    let username = Username::new(value).expect("username should validate");
    assert_eq!(username.as_ref(), value);
}

#[rstest]
#[case("", AccountValidationError::EmptyUsername)]
#[case("has space", AccountValidationError::UsernameInvalidCharacters)]
#[case("semi;colon", AccountValidationError::UsernameInvalidCharacters)]
#[case("me", AccountValidationError::ReservedUsername)]
fn username_rejects_invalid_values(
    #[case] value: &str,
    #[case] expected: AccountValidationError,
) {
    let err = Username::new(value).expect_err("username should be rejected");
    assert_eq!(err, expected);
}

#[test]
fn username_rejects_overlong_values() {
    let value = "x".repeat(USERNAME_MAX + 1);
    let err = Username::new(value).expect_err("overlong username should be rejected");
    assert_eq!(err, AccountValidationError::UsernameTooLong { max: USERNAME_MAX });
}

#[rstest]
#[case("reader@example.org")]
#[case("first.last+tag@sub.domain.example")]
fn email_accepts_plain_addresses(#[case] value: &str) {
    let email = EmailAddress::new(value).expect("email should validate");
    assert_eq!(email.as_ref(), value);
}

#[rstest]
#[case("", AccountValidationError::EmptyEmail)]
#[case("no-at-sign", AccountValidationError::MalformedEmail)]
#[case("@missing-local", AccountValidationError::MalformedEmail)]
#[case("missing-domain@", AccountValidationError::MalformedEmail)]
#[case("two@@ats", AccountValidationError::MalformedEmail)]
#[case("spaced out@example.org", AccountValidationError::MalformedEmail)]
fn email_rejects_malformed_addresses(
    #[case] value: &str,
    #[case] expected: AccountValidationError,
) {
    let err = EmailAddress::new(value).expect_err("email should be rejected");
    assert_eq!(err, expected);
}

#[rstest]
#[case("user", Role::User)]
#[case("moderator", Role::Moderator)]
#[case("admin", Role::Admin)]
fn role_parses_stable_names(#[case] name: &str, #[case] expected: Role) {
    let role: Role = name.parse().expect("role should parse");
    assert_eq!(role, expected);
    assert_eq!(role.as_str(), name);
}

#[test]
fn role_rejects_unknown_names() {
    let err = "owner".parse::<Role>().expect_err("unknown role should fail");
    assert_eq!(err, AccountValidationError::UnknownRole);
}

#[rstest]
#[case(Role::User, false, false, false, false)]
#[case(Role::User, true, true, true, true)]
#[case(Role::Moderator, false, false, true, false)]
#[case(Role::Admin, false, true, true, true)]
fn capability_predicates_follow_role_and_superuser_flag(
    #[case] role: Role,
    #[case] is_superuser: bool,
    #[case] catalogue: bool,
    #[case] moderate: bool,
    #[case] accounts: bool,
) {
    let account = fixture_account(role, is_superuser);
    assert_eq!(account.can_write_catalogue(), catalogue);
    assert_eq!(account.can_moderate(), moderate);
    assert_eq!(account.can_manage_accounts(), accounts);
}

#[test]
fn new_accounts_default_to_the_user_role() {
    let account = fixture_account(Role::default(), false);
    assert_eq!(account.role, Role::User);
    assert!(!account.is_superuser);
    assert!(account.first_name.is_none());
}
