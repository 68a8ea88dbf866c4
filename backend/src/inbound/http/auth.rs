//! Signup and token-exchange handlers.
//!
//! ```text
//! POST /api/v1/auth/signup {"username":"reader","email":"reader@example.org"}
//! POST /api/v1/auth/token {"username":"reader","confirmation_code":"..."}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::Error;

use super::ApiResult;
use super::state::HttpState;

/// Request body for `POST /api/v1/auth/signup`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
}

/// Response body echoing the registered identity.
///
/// The confirmation code itself travels only by email.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

/// Request body for `POST /api/v1/auth/token`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

/// Response body carrying the signed access token.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Register an account and mail a confirmation code.
///
/// Re-signup with the identical (username, email) pair is idempotent and
/// re-issues a fresh code.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Code sent", body = SignupResponse),
        (status = 400, description = "Validation failure or conflicting registration", body = Error),
        (status = 503, description = "Mail delivery failed", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<web::Json<SignupResponse>> {
    let SignupRequest { username, email } = payload.into_inner();
    let (username, email) = state.signup.signup(&username, &email).await?;
    Ok(web::Json(SignupResponse {
        username: username.into(),
        email: email.into(),
    }))
}

/// Exchange a confirmation code for a signed access token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Incorrect confirmation code", body = Error),
        (status = 404, description = "Unknown username", body = Error)
    ),
    tags = ["auth"],
    operation_id = "issueToken",
    security([])
)]
#[post("/auth/token")]
pub async fn token(
    state: web::Data<HttpState>,
    payload: web::Json<TokenRequest>,
) -> ApiResult<HttpResponse> {
    let TokenRequest {
        username,
        confirmation_code,
    } = payload.into_inner();
    let token = state.signup.issue_token(&username, &confirmation_code).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
