//! Domain ports and supporting types for the hexagonal boundary.

mod account_repository;
mod catalogue_repository;
mod comment_repository;
mod mailer;
mod review_repository;

pub use account_repository::{
    AccountPersistenceError, AccountRepository, FixtureAccountRepository,
};
pub use catalogue_repository::{
    CataloguePersistenceError, CatalogueRepository, FixtureCatalogueRepository,
};
pub use comment_repository::{
    CommentPersistenceError, CommentRepository, FixtureCommentRepository,
};
pub use mailer::{MailDeliveryError, Mailer, RecordingMailer, SentMail, TracingMailer};
pub use review_repository::{
    FixtureReviewRepository, ReviewPersistenceError, ReviewRepository,
};
