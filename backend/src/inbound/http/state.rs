//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports, and stay testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountRepository, CatalogueRepository, CommentRepository, FixtureAccountRepository,
    FixtureCatalogueRepository, FixtureCommentRepository, FixtureReviewRepository, Mailer,
    ReviewRepository, TracingMailer,
};
use crate::domain::{
    AccessTokens, AccountService, CatalogueService, ConfirmationCodes, ReviewService,
    SignupService,
};

/// Parameter object bundling the outbound ports for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountRepository>,
    pub catalogue: Arc<dyn CatalogueRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub mailer: Arc<dyn Mailer>,
}

impl HttpStatePorts {
    /// In-memory ports for tests and database-less deployments.
    pub fn fixtures() -> Self {
        Self {
            accounts: Arc::new(FixtureAccountRepository::new()),
            catalogue: Arc::new(FixtureCatalogueRepository::new()),
            reviews: Arc::new(FixtureReviewRepository::new()),
            comments: Arc::new(FixtureCommentRepository::new()),
            mailer: Arc::new(TracingMailer),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountRepository>,
    pub tokens: Arc<AccessTokens>,
    pub signup: Arc<SignupService>,
    pub account_service: Arc<AccountService>,
    pub catalogue: Arc<CatalogueService>,
    pub reviews: Arc<ReviewService>,
}

impl HttpState {
    /// Wire the domain services over the given ports.
    ///
    /// `secret` signs both access tokens and confirmation codes; `clock`
    /// drives the dynamic year bound and code issuance timestamps.
    pub fn new(ports: HttpStatePorts, secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        let HttpStatePorts {
            accounts,
            catalogue,
            reviews,
            comments,
            mailer,
        } = ports;

        let tokens = Arc::new(AccessTokens::new(secret));
        let signup = Arc::new(SignupService::new(
            accounts.clone(),
            mailer,
            ConfirmationCodes::new(secret),
            tokens.clone(),
            clock.clone(),
        ));
        let account_service = Arc::new(AccountService::new(accounts.clone(), clock.clone()));
        let catalogue_service = Arc::new(CatalogueService::new(
            catalogue,
            reviews.clone(),
            clock.clone(),
        ));
        let review_service = Arc::new(ReviewService::new(
            reviews,
            comments,
            catalogue_service.clone(),
            clock,
        ));

        Self {
            accounts,
            tokens,
            signup,
            account_service,
            catalogue: catalogue_service,
            reviews: review_service,
        }
    }
}
