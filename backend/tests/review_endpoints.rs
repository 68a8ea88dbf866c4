//! HTTP coverage for review and comment endpoints: the duplicate-review
//! rule, author auto-assignment, and ownership-based authorization.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

use backend::domain::user::Role;
use support::{api_app, bearer, signup_and_token, set_role, test_backend};

/// Create an admin token and one title, returning (admin token, title id).
async fn seed_title<S>(service: &S, backend: &support::TestBackend) -> (String, String)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let admin_token = signup_and_token(service, backend, "admin").await;
    set_role(backend, "admin", Role::Admin).await;
    let response = test::call_service(
        service,
        test::TestRequest::post()
            .uri("/api/v1/titles")
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "name": "Solaris", "year": 1972 }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    (admin_token, body["id"].as_str().expect("title id").to_owned())
}

#[actix_web::test]
async fn a_review_is_created_with_the_actor_as_author() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;
    let (_, title_id) = seed_title(&app, &backend).await;
    let token = signup_and_token(&app, &backend, "alice").await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/titles/{title_id}/reviews"))
            .insert_header(bearer(&token))
            .set_json(json!({ "text": "a fine film", "score": 8 }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["author"], "alice");
    assert_eq!(body["score"], 8);
    assert_eq!(body["title"], title_id);
}

#[actix_web::test]
async fn a_second_review_for_the_same_title_is_rejected() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;
    let (_, title_id) = seed_title(&app, &backend).await;
    let token = signup_and_token(&app, &backend, "alice").await;

    let uri = format!("/api/v1/titles/{title_id}/reviews");
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(&token))
            .set_json(json!({ "text": "first", "score": 8 }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(&token))
            .set_json(json!({ "text": "second", "score": 3 }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["message"], "you have already reviewed this title");

    // Another author may still review the same title.
    let bob = signup_and_token(&app, &backend, "bob").await;
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(&bob))
            .set_json(json!({ "text": "fresh eyes", "score": 9 }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn anonymous_requests_may_list_reviews_and_comments() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;
    let (_, title_id) = seed_title(&app, &backend).await;
    let token = signup_and_token(&app, &backend, "alice").await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/titles/{title_id}/reviews"))
            .insert_header(bearer(&token))
            .set_json(json!({ "text": "readable", "score": 7 }))
            .to_request(),
    )
    .await;
    let review: Value = test::read_body_json(response).await;
    let review_id = review["id"].as_str().expect("review id");

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/titles/{title_id}/reviews"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed: Value = test::read_body_json(response).await;
    assert_eq!(listed.as_array().expect("review array").len(), 1);

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/titles/{title_id}/reviews/{review_id}/comments"
            ))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_web::test]
async fn only_authors_and_moderation_roles_may_edit_a_review() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;
    let (_, title_id) = seed_title(&app, &backend).await;
    let alice = signup_and_token(&app, &backend, "alice").await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/titles/{title_id}/reviews"))
            .insert_header(bearer(&alice))
            .set_json(json!({ "text": "original", "score": 5 }))
            .to_request(),
    )
    .await;
    let review: Value = test::read_body_json(response).await;
    let review_uri = format!(
        "/api/v1/titles/{title_id}/reviews/{}",
        review["id"].as_str().expect("review id")
    );

    // A non-author plain user is rejected.
    let mallory = signup_and_token(&app, &backend, "mallory").await;
    let response = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&review_uri)
            .insert_header(bearer(&mallory))
            .set_json(json!({ "text": "defaced" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The author may edit their own review.
    let response = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&review_uri)
            .insert_header(bearer(&alice))
            .set_json(json!({ "score": 9 }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["score"], 9);

    // A moderator may edit anyone's review.
    let moderator = signup_and_token(&app, &backend, "mod").await;
    set_role(&backend, "mod", Role::Moderator).await;
    let response = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&review_uri)
            .insert_header(bearer(&moderator))
            .set_json(json!({ "text": "tidied up" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // And delete it.
    let response = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&review_uri)
            .insert_header(bearer(&moderator))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn comments_are_scoped_to_their_review() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;
    let (_, title_id) = seed_title(&app, &backend).await;
    let alice = signup_and_token(&app, &backend, "alice").await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/titles/{title_id}/reviews"))
            .insert_header(bearer(&alice))
            .set_json(json!({ "text": "original", "score": 5 }))
            .to_request(),
    )
    .await;
    let review: Value = test::read_body_json(response).await;
    let review_id = review["id"].as_str().expect("review id");

    let bob = signup_and_token(&app, &backend, "bob").await;
    let comments_uri = format!("/api/v1/titles/{title_id}/reviews/{review_id}/comments");
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&comments_uri)
            .insert_header(bearer(&bob))
            .set_json(json!({ "text": "agreed" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let comment: Value = test::read_body_json(response).await;
    assert_eq!(comment["author"], "bob");

    // Unknown review id under the same title is a 404.
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!(
                "/api/v1/titles/{title_id}/reviews/{}/comments",
                uuid::Uuid::new_v4()
            ))
            .insert_header(bearer(&bob))
            .set_json(json!({ "text": "into the void" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Anonymous comment creation is rejected.
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&comments_uri)
            .set_json(json!({ "text": "drive-by" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
