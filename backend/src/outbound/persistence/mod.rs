//! Diesel/PostgreSQL persistence adapters implementing the repository ports.

mod diesel_account_repository;
mod diesel_catalogue_repository;
mod diesel_comment_repository;
mod diesel_review_repository;
mod models;
mod pool;
pub mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_catalogue_repository::DieselCatalogueRepository;
pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
