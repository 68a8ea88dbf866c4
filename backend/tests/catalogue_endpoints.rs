//! HTTP coverage for catalogue endpoints: public reads, admin-gated writes,
//! and the dynamic release-year bound.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::{Datelike, Utc};
use serde_json::{Value, json};

use backend::domain::user::Role;
use support::{api_app, bearer, signup_and_token, set_role, test_backend};

#[actix_web::test]
async fn anonymous_requests_may_list_but_not_create() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;

    for uri in ["/api/v1/titles", "/api/v1/categories", "/api/v1/genres"] {
        let response =
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body, json!([]));
    }

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/titles")
            .set_json(json!({ "name": "Solaris", "year": 1972 }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn catalogue_writes_require_the_admin_role() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;

    let reader_token = signup_and_token(&app, &backend, "reader").await;
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/categories")
            .insert_header(bearer(&reader_token))
            .set_json(json!({ "name": "Films", "slug": "films" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_token = signup_and_token(&app, &backend, "admin").await;
    set_role(&backend, "admin", Role::Admin).await;
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/categories")
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "name": "Films", "slug": "films" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body, json!({ "name": "Films", "slug": "films" }));
}

#[actix_web::test]
async fn title_creation_enforces_the_current_year_bound() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;
    let admin_token = signup_and_token(&app, &backend, "admin").await;
    set_role(&backend, "admin", Role::Admin).await;

    let current_year = Utc::now().year();
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/titles")
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "name": "From the future", "year": current_year + 1 }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/titles")
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "name": "This year", "year": current_year }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["year"], current_year);
    assert_eq!(body["rating"], Value::Null);
}

#[actix_web::test]
async fn titles_embed_category_and_genres() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;
    let admin_token = signup_and_token(&app, &backend, "admin").await;
    set_role(&backend, "admin", Role::Admin).await;

    for (uri, payload) in [
        ("/api/v1/categories", json!({ "name": "Films", "slug": "films" })),
        ("/api/v1/genres", json!({ "name": "Science fiction", "slug": "sci-fi" })),
        ("/api/v1/genres", json!({ "name": "Drama", "slug": "drama" })),
    ] {
        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(uri)
                .insert_header(bearer(&admin_token))
                .set_json(payload)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/titles")
            .insert_header(bearer(&admin_token))
            .set_json(json!({
                "name": "Solaris",
                "year": 1972,
                "category": "films",
                "genre": ["sci-fi", "drama"],
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["category"]["slug"], "films");
    assert_eq!(
        body["genre"]
            .as_array()
            .expect("genre array")
            .len(),
        2
    );

    let title_id = body["id"].as_str().expect("title id").to_owned();
    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/titles/{title_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_web::test]
async fn unknown_reference_slugs_fail_title_creation() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;
    let admin_token = signup_and_token(&app, &backend, "admin").await;
    set_role(&backend, "admin", Role::Admin).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/titles")
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "name": "Solaris", "year": 1972, "category": "nope" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn deletes_are_admin_only_and_scoped() {
    let backend = test_backend();
    let app = test::init_service(api_app(backend.state.clone())).await;
    let admin_token = signup_and_token(&app, &backend, "admin").await;
    set_role(&backend, "admin", Role::Admin).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/genres")
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "name": "Drama", "slug": "drama" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/genres/drama")
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/genres/drama")
            .insert_header(bearer(&admin_token))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/genres/drama")
            .insert_header(bearer(&admin_token))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
