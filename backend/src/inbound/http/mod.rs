//! HTTP inbound adapter exposing REST endpoints.

pub mod actor;
pub mod auth;
pub mod catalogue;
pub mod error;
pub mod health;
pub mod reviews;
pub mod state;
pub mod users;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` route on the given service config.
///
/// The self-scoped `me` handlers are registered before the parameterised
/// `{username}` routes so the sentinel wins the match.
pub fn configure_api(config: &mut web::ServiceConfig) {
    config.service(
        web::scope("/api/v1")
            .service(auth::signup)
            .service(auth::token)
            .service(users::list_accounts)
            .service(users::create_account)
            .service(users::current_account)
            .service(users::update_current_account)
            .service(users::get_account)
            .service(users::update_account)
            .service(users::delete_account)
            .service(catalogue::list_categories)
            .service(catalogue::create_category)
            .service(catalogue::delete_category)
            .service(catalogue::list_genres)
            .service(catalogue::create_genre)
            .service(catalogue::delete_genre)
            .service(catalogue::list_titles)
            .service(catalogue::create_title)
            .service(catalogue::get_title)
            .service(catalogue::update_title)
            .service(catalogue::delete_title)
            .service(reviews::list_reviews)
            .service(reviews::create_review)
            .service(reviews::get_review)
            .service(reviews::update_review)
            .service(reviews::delete_review)
            .service(reviews::list_comments)
            .service(reviews::create_comment)
            .service(reviews::get_comment)
            .service(reviews::update_comment)
            .service(reviews::delete_comment),
    );
}
