//! Signup, confirmation codes, and token exchange.
//!
//! The two-phase flow is stateless between phases except for the persisted
//! account row: a confirmation code is a keyed digest of the account's
//! current state, so re-signup (which stamps a fresh `code_issued_at`)
//! invalidates every previously issued code without any token storage.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountPersistenceError, AccountRepository, MailDeliveryError, Mailer,
};
use crate::domain::token::AccessTokens;
use crate::domain::user::{Account, AccountValidationError, EmailAddress, Username};
use crate::domain::{ApiResult, Error};

/// Subject line for confirmation-code mail.
const MAIL_SUBJECT: &str = "Confirmation code requested for access to the Backlot API";

/// Length of the confirmation code in digest bytes before hex encoding.
const CODE_BYTES: usize = 16;

/// Derives and checks confirmation codes.
///
/// A code is a truncated keyed SHA-256 digest over the account fields that
/// define "current state": id, username, email, role, and the issuance
/// timestamp. Changing any of them (including re-signup) changes the code.
pub struct ConfirmationCodes {
    secret: Vec<u8>,
}

impl ConfirmationCodes {
    /// Build a code service from raw secret bytes.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
        }
    }

    /// Derive the confirmation code for the account's current state.
    pub fn code_for(&self, account: &Account) -> Zeroizing<String> {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(account.id.as_bytes());
        hasher.update(account.username.as_ref().as_bytes());
        hasher.update(account.email.as_ref().as_bytes());
        hasher.update(account.role.as_str().as_bytes());
        hasher.update(account.code_issued_at.timestamp_micros().to_le_bytes());
        let digest = hasher.finalize();
        Zeroizing::new(hex::encode(&digest[..CODE_BYTES]))
    }

    /// Whether `presented` matches the code for the account's current state.
    pub fn verify(&self, account: &Account, presented: &str) -> bool {
        let expected = self.code_for(account);
        // Hex digests have a fixed length, so a plain comparison leaks at
        // most the mismatch position of an already-unguessable value.
        expected.as_str() == presented
    }
}

/// Use-case service for the signup and token-exchange endpoints.
pub struct SignupService {
    accounts: Arc<dyn AccountRepository>,
    mailer: Arc<dyn Mailer>,
    codes: ConfirmationCodes,
    tokens: Arc<AccessTokens>,
    clock: Arc<dyn Clock>,
}

impl SignupService {
    /// Wire the service from its collaborators.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        mailer: Arc<dyn Mailer>,
        codes: ConfirmationCodes,
        tokens: Arc<AccessTokens>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            mailer,
            codes,
            tokens,
            clock,
        }
    }

    /// Register (or re-register) an account and mail a confirmation code.
    ///
    /// Re-signup with the identical (username, email) pair is idempotent and
    /// re-issues a fresh code. A username or email that is already bound to a
    /// different counterpart is rejected.
    pub async fn signup(&self, username: &str, email: &str) -> ApiResult<(Username, EmailAddress)> {
        let username = Username::new(username).map_err(map_validation_error)?;
        let email = EmailAddress::new(email).map_err(map_validation_error)?;

        let by_username = self
            .accounts
            .find_by_username(username.as_ref())
            .await
            .map_err(map_account_persistence_error)?;
        if let Some(existing) = &by_username {
            if existing.email != email {
                return Err(conflicting_registration("username"));
            }
        }
        let by_email = self
            .accounts
            .find_by_email(email.as_ref())
            .await
            .map_err(map_account_persistence_error)?;
        if let Some(existing) = &by_email {
            if existing.username != username {
                return Err(conflicting_registration("email"));
            }
        }

        let account = match by_username {
            Some(mut existing) => {
                // Fresh issuance timestamp invalidates previously sent codes.
                existing.code_issued_at = self.clock.utc();
                self.accounts
                    .update(&existing)
                    .await
                    .map_err(map_account_persistence_error)?;
                existing
            }
            None => {
                let account = Account::new(username.clone(), email.clone(), self.clock.utc());
                self.accounts
                    .insert(&account)
                    .await
                    .map_err(map_account_persistence_error)?;
                account
            }
        };

        let code = self.codes.code_for(&account);
        let body = format!("Your confirmation code: {}", code.as_str());
        self.mailer
            .send(account.email.as_ref(), MAIL_SUBJECT, &body)
            .await
            .map_err(map_mail_error)?;

        Ok((account.username, account.email))
    }

    /// Exchange a confirmation code for a signed access token.
    pub async fn issue_token(&self, username: &str, confirmation_code: &str) -> ApiResult<String> {
        let account = self
            .accounts
            .find_by_username(username)
            .await
            .map_err(map_account_persistence_error)?
            .ok_or_else(|| Error::not_found("no account with this username"))?;

        if !self.codes.verify(&account, confirmation_code) {
            // Keep the message independent of which sub-condition failed.
            return Err(Error::invalid_request(
                "the provided confirmation code is incorrect",
            ));
        }

        self.tokens.issue(account.id, self.clock.utc())
    }
}

fn conflicting_registration(field: &str) -> Error {
    Error::invalid_request("registration conflicts with an existing account")
        .with_details(json!({ "field": field, "code": "conflicting_registration" }))
}

fn map_validation_error(err: AccountValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

pub(crate) fn map_account_persistence_error(err: AccountPersistenceError) -> Error {
    match err {
        AccountPersistenceError::Connection { message } => Error::service_unavailable(message),
        AccountPersistenceError::Query { message } => Error::internal(message),
        // Unique-constraint races lost after the advisory checks passed.
        AccountPersistenceError::DuplicateUsername | AccountPersistenceError::DuplicateEmail => {
            Error::conflict("registration conflicts with an existing account")
        }
    }
}

fn map_mail_error(err: MailDeliveryError) -> Error {
    let MailDeliveryError::Delivery { message } = err;
    tracing::error!(error = %message, "confirmation mail delivery failed");
    Error::service_unavailable("failed to deliver the confirmation email")
}
