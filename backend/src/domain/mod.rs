//! Domain primitives, aggregates, policies, and use-case services.
//!
//! Purpose: define strongly typed entities and the access-control,
//! review-uniqueness, and signup/token logic behind the HTTP adapter. Types
//! stay transport-agnostic; invariants and serde contracts live in each
//! type's Rustdoc.

pub mod account_service;
pub mod catalogue;
pub mod catalogue_service;
pub mod error;
pub mod policy;
pub mod ports;
pub mod review;
pub mod review_service;
pub mod signup;
mod slug;
pub mod token;
pub mod user;

pub use self::account_service::{AccountDraft, AccountPatch, AccountService};
pub use self::catalogue_service::{CatalogueService, TitleInput};
pub use self::error::{Error, ErrorCode};
pub use self::policy::Actor;
pub use self::review_service::ReviewService;
pub use self::signup::{ConfirmationCodes, SignupService};
pub use self::token::AccessTokens;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
