//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: every inbound path, the shared schemas, and the bearer
//! token security scheme. Swagger UI serves the document in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token issued by POST /api/v1/auth/token.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Backlot API",
        description = "Content-review HTTP interface: catalogue, reviews, \
                       comments, accounts, and signup/token authentication."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::token,
        crate::inbound::http::users::list_accounts,
        crate::inbound::http::users::create_account,
        crate::inbound::http::users::current_account,
        crate::inbound::http::users::update_current_account,
        crate::inbound::http::users::get_account,
        crate::inbound::http::users::update_account,
        crate::inbound::http::users::delete_account,
        crate::inbound::http::catalogue::list_categories,
        crate::inbound::http::catalogue::create_category,
        crate::inbound::http::catalogue::delete_category,
        crate::inbound::http::catalogue::list_genres,
        crate::inbound::http::catalogue::create_genre,
        crate::inbound::http::catalogue::delete_genre,
        crate::inbound::http::catalogue::list_titles,
        crate::inbound::http::catalogue::create_title,
        crate::inbound::http::catalogue::get_title,
        crate::inbound::http::catalogue::update_title,
        crate::inbound::http::catalogue::delete_title,
        crate::inbound::http::reviews::list_reviews,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::reviews::get_review,
        crate::inbound::http::reviews::update_review,
        crate::inbound::http::reviews::delete_review,
        crate::inbound::http::reviews::list_comments,
        crate::inbound::http::reviews::create_comment,
        crate::inbound::http::reviews::get_comment,
        crate::inbound::http::reviews::update_comment,
        crate::inbound::http::reviews::delete_comment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::error::Error,
        crate::domain::error::ErrorCode,
        crate::domain::catalogue::Category,
        crate::domain::catalogue::Genre,
        crate::domain::catalogue::Title,
        crate::inbound::http::auth::SignupRequest,
        crate::inbound::http::auth::SignupResponse,
        crate::inbound::http::auth::TokenRequest,
        crate::inbound::http::auth::TokenResponse,
        crate::inbound::http::users::AccountDto,
        crate::inbound::http::users::CreateAccountRequest,
        crate::inbound::http::users::UpdateAccountRequest,
        crate::inbound::http::catalogue::LabelRequest,
        crate::inbound::http::catalogue::TitleRequest,
        crate::inbound::http::catalogue::TitlePatchRequest,
        crate::inbound::http::reviews::ReviewDto,
        crate::inbound::http::reviews::CommentDto,
        crate::inbound::http::reviews::ReviewRequest,
        crate::inbound::http::reviews::ReviewPatchRequest,
        crate::inbound::http::reviews::CommentRequest,
    ))
)]
pub struct ApiDoc;
