//! Account data model: identity, role, and profile fields.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by the account value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyUsername,
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    ReservedUsername,
    NameTooLong { max: usize },
    EmptyEmail,
    EmailTooLong { max: usize },
    MalformedEmail,
    UnknownRole,
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, digits, and the characters . @ + -",
            ),
            Self::ReservedUsername => write!(f, "username 'me' is reserved"),
            Self::NameTooLong { max } => {
                write!(f, "name fields must be at most {max} characters")
            }
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::MalformedEmail => write!(f, "email address is malformed"),
            Self::UnknownRole => write!(f, "role must be one of user, moderator, admin"),
        }
    }
}

impl std::error::Error for AccountValidationError {}

/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 150;
/// Maximum allowed length for an email address.
pub const EMAIL_MAX: usize = 254;
/// Maximum allowed length for profile name fields.
pub const NAME_MAX: usize = 150;

/// Username reserved for the self-scoped account endpoint.
///
/// `GET /users/me/` routes on this literal, so no account may claim it.
pub const RESERVED_USERNAME: &str = "me";

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length and the reserved value are enforced separately; this regex
        // constrains allowed characters.
        Regex::new(r"^[\w.@+-]+$").unwrap_or_else(|error| {
            panic!("username regex failed to compile: {error}")
        })
    })
}

/// Validated account username.
///
/// ## Invariants
/// - Non-empty, at most [`USERNAME_MAX`] characters.
/// - Matches `^[\w.@+-]+$`.
/// - Never equals the reserved routing sentinel [`RESERVED_USERNAME`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(value: impl Into<String>) -> Result<Self, AccountValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(AccountValidationError::EmptyUsername);
        }
        if value.chars().count() > USERNAME_MAX {
            return Err(AccountValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(&value) {
            return Err(AccountValidationError::UsernameInvalidCharacters);
        }
        if value == RESERVED_USERNAME {
            return Err(AccountValidationError::ReservedUsername);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated account email address.
///
/// ## Invariants
/// - Non-empty, at most [`EMAIL_MAX`] characters.
/// - Contains exactly one `@` with non-empty local part and domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(value: impl Into<String>) -> Result<Self, AccountValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(AccountValidationError::EmptyEmail);
        }
        if value.chars().count() > EMAIL_MAX {
            return Err(AccountValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let mut parts = value.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(AccountValidationError::MalformedEmail);
        }
        if value.contains(char::is_whitespace) {
            return Err(AccountValidationError::MalformedEmail);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Closed role enumeration.
///
/// Roles are ordered by privilege only through the explicit capability
/// predicates on [`Account`]; the enum itself carries no ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account: may author reviews and comments.
    #[default]
    User,
    /// May edit or delete any review or comment.
    Moderator,
    /// Full catalogue and account management rights.
    Admin,
}

impl Role {
    /// Stable lowercase name used in the API and the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = AccountValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            _ => Err(AccountValidationError::UnknownRole),
        }
    }
}

/// Registered account.
///
/// ## Invariants
/// - `username` and `email` are globally unique (storage enforced).
/// - `code_issued_at` advances on every signup for the account, which
///   invalidates previously issued confirmation codes.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Stable identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: Username,
    /// Unique contact address; receives confirmation codes.
    pub email: EmailAddress,
    /// Assigned role.
    pub role: Role,
    /// Deployment operators flagged outside the role system.
    pub is_superuser: bool,
    /// Optional profile field.
    pub first_name: Option<String>,
    /// Optional profile field.
    pub last_name: Option<String>,
    /// Optional free-text profile field.
    pub bio: Option<String>,
    /// Timestamp of the most recent confirmation-code issuance.
    pub code_issued_at: DateTime<Utc>,
}

impl Account {
    /// Create a fresh account with the default role and empty profile.
    pub fn new(
        username: Username,
        email: EmailAddress,
        code_issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            role: Role::default(),
            is_superuser: false,
            first_name: None,
            last_name: None,
            bio: None,
            code_issued_at,
        }
    }

    /// Whether this account may create or mutate catalogue entries.
    pub fn can_write_catalogue(&self) -> bool {
        self.role == Role::Admin || self.is_superuser
    }

    /// Whether this account may edit or remove any review or comment.
    pub fn can_moderate(&self) -> bool {
        self.role == Role::Moderator || self.can_write_catalogue()
    }

    /// Whether this account may administer other accounts.
    pub fn can_manage_accounts(&self) -> bool {
        self.role == Role::Admin || self.is_superuser
    }
}

/// Validate an optional profile name field.
pub(crate) fn validate_profile_name(value: &str) -> Result<(), AccountValidationError> {
    if value.chars().count() > NAME_MAX {
        return Err(AccountValidationError::NameTooLong { max: NAME_MAX });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
