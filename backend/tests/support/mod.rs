//! Shared helpers for HTTP integration tests.
//!
//! Tests run the full Actix app over in-memory fixture ports with a
//! recording mailer, so the signup/token flow works end to end without
//! PostgreSQL or a real mail transport.

// Each test binary uses a subset of these helpers.
#![allow(dead_code)]

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{App, test, web};
use mockable::DefaultClock;
use serde_json::Value;

use backend::domain::ports::{
    AccountRepository, FixtureAccountRepository, FixtureCatalogueRepository,
    FixtureCommentRepository, FixtureReviewRepository, RecordingMailer,
};
use backend::domain::user::Role;
use backend::inbound::http::configure_api;
use backend::inbound::http::state::{HttpState, HttpStatePorts};

/// Secret signing tokens and confirmation codes in tests.
pub const SECRET: &[u8] = b"integration-test-secret";

/// Handle onto the app state and observable side channels.
pub struct TestBackend {
    pub state: web::Data<HttpState>,
    pub mailer: Arc<RecordingMailer>,
}

/// Build a backend over fresh fixture ports.
pub fn test_backend() -> TestBackend {
    let mailer = Arc::new(RecordingMailer::new());
    let ports = HttpStatePorts {
        accounts: Arc::new(FixtureAccountRepository::new()),
        catalogue: Arc::new(FixtureCatalogueRepository::new()),
        reviews: Arc::new(FixtureReviewRepository::new()),
        comments: Arc::new(FixtureCommentRepository::new()),
        mailer: mailer.clone(),
    };
    let state = web::Data::new(HttpState::new(ports, SECRET, Arc::new(DefaultClock)));
    TestBackend { state, mailer }
}

/// Build the full API app around the given state.
pub fn api_app(
    state: web::Data<HttpState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(state).configure(configure_api)
}

/// Extract the confirmation code from the most recent recorded mail.
pub fn latest_code(mailer: &RecordingMailer) -> String {
    let sent = mailer.sent();
    let mail = sent.last().expect("a confirmation mail should be recorded");
    mail.body
        .rsplit(' ')
        .next()
        .expect("mail body should end with the code")
        .to_owned()
}

/// Sign up `username` and exchange the mailed code for a bearer token.
pub async fn signup_and_token<S>(service: &S, backend: &TestBackend, username: &str) -> String
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let signup = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(serde_json::json!({
            "username": username,
            "email": format!("{username}@example.org"),
        }))
        .to_request();
    let response = test::call_service(service, signup).await;
    assert!(
        response.status().is_success(),
        "signup for {username} failed: {}",
        response.status()
    );

    let code = latest_code(&backend.mailer);
    let token_req = test::TestRequest::post()
        .uri("/api/v1/auth/token")
        .set_json(serde_json::json!({
            "username": username,
            "confirmation_code": code,
        }))
        .to_request();
    let response = test::call_service(service, token_req).await;
    assert!(
        response.status().is_success(),
        "token exchange for {username} failed: {}",
        response.status()
    );
    let body: Value = test::read_body_json(response).await;
    body["token"]
        .as_str()
        .expect("token field should be a string")
        .to_owned()
}

/// Promote an existing account to the given role via the repository.
pub async fn set_role(backend: &TestBackend, username: &str, role: Role) {
    let mut account = backend
        .state
        .accounts
        .find_by_username(username)
        .await
        .expect("account lookup should succeed")
        .expect("account should exist");
    account.role = role;
    backend
        .state
        .accounts
        .update(&account)
        .await
        .expect("account update should succeed");
}

/// Bearer authorization header for the given token.
pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}
