//! Signed access credentials.
//!
//! Tokens are stateless HS256 JWTs carrying the account id as subject; the
//! actor extractor verifies them and loads a fresh account snapshot per
//! request, so role changes take effect without token revocation machinery.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ApiResult, Error};

/// Lifetime of an issued access token.
const ACCESS_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Issues and verifies signed access tokens.
pub struct AccessTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AccessTokens {
    /// Build a token service from raw secret bytes.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token asserting `account_id`, expiring relative to `now`.
    pub fn issue(&self, account_id: Uuid, now: DateTime<Utc>) -> ApiResult<String> {
        let claims = Claims {
            sub: account_id.to_string(),
            exp: (now + Duration::hours(ACCESS_TOKEN_TTL_HOURS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| Error::internal(format!("failed to sign access token: {err}")))
    }

    /// Verify a presented token and return the asserted account id.
    ///
    /// Expired, malformed, and mis-signed tokens all map to the same
    /// `401 Unauthorized` error.
    pub fn verify(&self, token: &str) -> ApiResult<Uuid> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| Error::unauthorized("invalid or expired token"))?;
        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| Error::unauthorized("invalid or expired token"))
    }
}
