//! End-to-end coverage of the signup/confirmation/token flow over HTTP.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

use support::{api_app, bearer, latest_code, signup_and_token, test_backend};

#[actix_web::test]
async fn signup_echoes_identity_and_never_returns_the_code() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(json!({ "username": "reader", "email": "reader@example.org" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(
        body,
        json!({ "username": "reader", "email": "reader@example.org" })
    );

    let sent = backend.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "reader@example.org");
}

#[actix_web::test]
async fn signup_rejects_the_reserved_username() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(json!({ "username": "me", "email": "me@example.org" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(backend.mailer.sent().is_empty());
}

#[actix_web::test]
async fn duplicate_signup_is_idempotent_but_mismatches_conflict() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;

    for _ in 0..2 {
        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(json!({ "username": "reader", "email": "reader@example.org" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(backend.mailer.sent().len(), 2);

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(json!({ "username": "reader", "email": "other@example.org" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(json!({ "username": "other", "email": "reader@example.org" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn token_exchange_validates_username_and_code() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/token")
            .set_json(json!({ "username": "ghost", "confirmation_code": "anything" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(json!({ "username": "reader", "email": "reader@example.org" }))
            .to_request(),
    )
    .await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/token")
            .set_json(json!({ "username": "reader", "confirmation_code": "wrong" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["message"], "the provided confirmation code is incorrect");

    let code = latest_code(&backend.mailer);
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/token")
            .set_json(json!({ "username": "reader", "confirmation_code": code }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[actix_web::test]
async fn an_issued_token_authenticates_the_me_endpoint() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;

    let token = signup_and_token(&app, &backend, "reader").await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users/me")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["username"], "reader");
    assert_eq!(body["role"], "user");

    let response = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/users/me").to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
