//! Account administration and self-scoped `me` handlers.
//!
//! ```text
//! GET/POST /api/v1/users            (admin)
//! GET/PATCH /api/v1/users/me       (owner)
//! GET/PATCH/DELETE /api/v1/users/{username}  (admin)
//! ```
//!
//! `me` is a routing sentinel, not a username: registration order sends it to
//! the self-scoped handlers and the domain rejects accounts named `me`.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::user::{Account, Role};
use crate::domain::{AccountDraft, AccountPatch, Error};

use super::ApiResult;
use super::actor::RequestActor;
use super::state::HttpState;

/// Account representation returned by every user endpoint.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AccountDto {
    pub username: String,
    pub email: String,
    #[schema(example = "user")]
    pub role: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

impl From<Account> for AccountDto {
    fn from(account: Account) -> Self {
        Self {
            username: account.username.into(),
            email: account.email.into(),
            role: account.role.as_str().to_owned(),
            first_name: account.first_name,
            last_name: account.last_name,
            bio: account.bio,
        }
    }
}

/// Request body for admin account creation.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateAccountRequest {
    pub username: String,
    pub email: String,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

/// Request body for partial account updates.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateAccountRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

fn parse_role(role: Option<String>) -> ApiResult<Option<Role>> {
    role.map(|value| {
        value
            .parse::<Role>()
            .map_err(|err| Error::invalid_request(err.to_string()))
    })
    .transpose()
}

impl UpdateAccountRequest {
    fn into_patch(self) -> ApiResult<AccountPatch> {
        Ok(AccountPatch {
            username: self.username,
            email: self.email,
            role: parse_role(self.role)?,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
        })
    }
}

/// List every account (admin only).
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Accounts", body = [AccountDto]),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "listAccounts"
)]
#[get("/users")]
pub async fn list_accounts(
    state: web::Data<HttpState>,
    actor: RequestActor,
) -> ApiResult<web::Json<Vec<AccountDto>>> {
    let accounts = state.account_service.list(&actor.into_inner()).await?;
    Ok(web::Json(accounts.into_iter().map(Into::into).collect()))
}

/// Create an account directly (admin only).
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = AccountDto),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "createAccount"
)]
#[post("/users")]
pub async fn create_account(
    state: web::Data<HttpState>,
    actor: RequestActor,
    payload: web::Json<CreateAccountRequest>,
) -> ApiResult<HttpResponse> {
    let CreateAccountRequest {
        username,
        email,
        role,
        first_name,
        last_name,
        bio,
    } = payload.into_inner();
    let draft = AccountDraft {
        username,
        email,
        role: parse_role(role)?,
        first_name,
        last_name,
        bio,
    };
    let account = state
        .account_service
        .create(&actor.into_inner(), draft)
        .await?;
    Ok(HttpResponse::Created().json(AccountDto::from(account)))
}

/// Fetch the requesting account's own record.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Own account", body = AccountDto),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentAccount"
)]
#[get("/users/me")]
pub async fn current_account(
    state: web::Data<HttpState>,
    actor: RequestActor,
) -> ApiResult<web::Json<AccountDto>> {
    let actor = actor.into_inner();
    let account = state.account_service.get_self(&actor)?;
    Ok(web::Json(AccountDto::from(account.clone())))
}

/// Partially update the requesting account's own record.
///
/// A `role` field in the body is ignored; the stored role is kept.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountDto),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateCurrentAccount"
)]
#[patch("/users/me")]
pub async fn update_current_account(
    state: web::Data<HttpState>,
    actor: RequestActor,
    payload: web::Json<UpdateAccountRequest>,
) -> ApiResult<web::Json<AccountDto>> {
    let patch = payload.into_inner().into_patch()?;
    let account = state
        .account_service
        .update_self(&actor.into_inner(), patch)
        .await?;
    Ok(web::Json(AccountDto::from(account)))
}

/// Fetch one account by username (admin only).
#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 200, description = "Account", body = AccountDto),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown username", body = Error)
    ),
    tags = ["users"],
    operation_id = "getAccount"
)]
#[get("/users/{username}")]
pub async fn get_account(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<AccountDto>> {
    let account = state
        .account_service
        .get(&actor.into_inner(), &path.into_inner())
        .await?;
    Ok(web::Json(AccountDto::from(account)))
}

/// Partially update one account by username (admin only).
#[utoipa::path(
    patch,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Account username")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountDto),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown username", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateAccount"
)]
#[patch("/users/{username}")]
pub async fn update_account(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<String>,
    payload: web::Json<UpdateAccountRequest>,
) -> ApiResult<web::Json<AccountDto>> {
    let patch = payload.into_inner().into_patch()?;
    let account = state
        .account_service
        .update(&actor.into_inner(), &path.into_inner(), patch)
        .await?;
    Ok(web::Json(AccountDto::from(account)))
}

/// Delete one account by username (admin only).
#[utoipa::path(
    delete,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown username", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteAccount"
)]
#[delete("/users/{username}")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state
        .account_service
        .delete(&actor.into_inner(), &path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
