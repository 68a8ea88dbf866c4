//! Port abstraction for review persistence adapters.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::review::Review;

/// Persistence errors raised by review repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewPersistenceError {
    /// Repository connection could not be established.
    #[error("review repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("review repository query failed: {message}")]
    Query { message: String },
    /// Insert violated the (title, author) unique constraint.
    ///
    /// This is the authoritative arbiter for the check/insert race; the
    /// service surfaces it as the same duplicate-review validation error as
    /// its advisory pre-check.
    #[error("a review by this author already exists for the title")]
    DuplicateReview,
}

impl ReviewPersistenceError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for review storage.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// List reviews for a title ordered by publication date.
    async fn list_for_title(&self, title_id: Uuid)
    -> Result<Vec<Review>, ReviewPersistenceError>;

    /// Fetch a review scoped to its title.
    async fn find(
        &self,
        title_id: Uuid,
        review_id: Uuid,
    ) -> Result<Option<Review>, ReviewPersistenceError>;

    /// Fetch the unique review a given author wrote for a title, if any.
    async fn find_by_title_and_author(
        &self,
        title_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<Review>, ReviewPersistenceError>;

    /// Insert a new review.
    async fn insert(&self, review: &Review) -> Result<(), ReviewPersistenceError>;

    /// Persist changes to an existing review.
    async fn update(&self, review: &Review) -> Result<(), ReviewPersistenceError>;

    /// Remove a review, reporting whether a row existed.
    async fn delete(
        &self,
        title_id: Uuid,
        review_id: Uuid,
    ) -> Result<bool, ReviewPersistenceError>;

    /// Average review score per title for the given identifiers.
    ///
    /// Unreviewed titles are absent from the result map.
    async fn average_scores(
        &self,
        title_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, f64>, ReviewPersistenceError>;
}

/// In-memory review repository used by tests and database-less deployments.
///
/// Mirrors the SQL unique constraint on (title, author) so the duplicate
/// error path stays exercisable without PostgreSQL.
#[derive(Debug, Default)]
pub struct FixtureReviewRepository {
    state: Mutex<Vec<Review>>,
}

impl FixtureReviewRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Review>> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl ReviewRepository for FixtureReviewRepository {
    async fn list_for_title(
        &self,
        title_id: Uuid,
    ) -> Result<Vec<Review>, ReviewPersistenceError> {
        let mut reviews: Vec<Review> = self
            .lock()
            .iter()
            .filter(|r| r.title_id == title_id)
            .cloned()
            .collect();
        reviews.sort_by_key(|r| r.pub_date);
        Ok(reviews)
    }

    async fn find(
        &self,
        title_id: Uuid,
        review_id: Uuid,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        Ok(self
            .lock()
            .iter()
            .find(|r| r.title_id == title_id && r.id == review_id)
            .cloned())
    }

    async fn find_by_title_and_author(
        &self,
        title_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        Ok(self
            .lock()
            .iter()
            .find(|r| r.title_id == title_id && r.author_id == author_id)
            .cloned())
    }

    async fn insert(&self, review: &Review) -> Result<(), ReviewPersistenceError> {
        let mut state = self.lock();
        if state
            .iter()
            .any(|r| r.title_id == review.title_id && r.author_id == review.author_id)
        {
            return Err(ReviewPersistenceError::DuplicateReview);
        }
        state.push(review.clone());
        Ok(())
    }

    async fn update(&self, review: &Review) -> Result<(), ReviewPersistenceError> {
        let mut state = self.lock();
        match state.iter_mut().find(|r| r.id == review.id) {
            Some(slot) => {
                *slot = review.clone();
                Ok(())
            }
            None => Err(ReviewPersistenceError::query("review does not exist")),
        }
    }

    async fn delete(
        &self,
        title_id: Uuid,
        review_id: Uuid,
    ) -> Result<bool, ReviewPersistenceError> {
        let mut state = self.lock();
        let before = state.len();
        state.retain(|r| !(r.title_id == title_id && r.id == review_id));
        Ok(state.len() < before)
    }

    async fn average_scores(
        &self,
        title_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, f64>, ReviewPersistenceError> {
        let state = self.lock();
        let mut sums: HashMap<Uuid, (i64, i64)> = HashMap::new();
        for review in state.iter().filter(|r| title_ids.contains(&r.title_id)) {
            let entry = sums.entry(review.title_id).or_insert((0, 0));
            entry.0 += i64::from(review.score.value());
            entry.1 += 1;
        }
        let averages = sums
            .into_iter()
            .map(|(id, (sum, count))| (id, sum as f64 / count as f64))
            .collect();
        Ok(averages)
    }
}
