//! Port abstraction for comment persistence adapters.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::review::Comment;

/// Persistence errors raised by comment repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentPersistenceError {
    /// Repository connection could not be established.
    #[error("comment repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("comment repository query failed: {message}")]
    Query { message: String },
}

impl CommentPersistenceError {
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

/// Port for comment storage.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// List comments under a review ordered by publication date.
    async fn list_for_review(
        &self,
        review_id: Uuid,
    ) -> Result<Vec<Comment>, CommentPersistenceError>;

    /// Fetch a comment scoped to its review.
    async fn find(
        &self,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, CommentPersistenceError>;

    /// Insert a new comment.
    async fn insert(&self, comment: &Comment) -> Result<(), CommentPersistenceError>;

    /// Persist changes to an existing comment.
    async fn update(&self, comment: &Comment) -> Result<(), CommentPersistenceError>;

    /// Remove a comment, reporting whether a row existed.
    async fn delete(
        &self,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> Result<bool, CommentPersistenceError>;

    /// Remove every comment under a review.
    ///
    /// Used when a review is deleted by a database-less deployment; SQL
    /// deployments rely on `ON DELETE CASCADE` instead.
    async fn delete_for_review(&self, review_id: Uuid) -> Result<(), CommentPersistenceError>;
}

/// In-memory comment repository used by tests and database-less deployments.
#[derive(Debug, Default)]
pub struct FixtureCommentRepository {
    state: Mutex<Vec<Comment>>,
}

impl FixtureCommentRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Comment>> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl CommentRepository for FixtureCommentRepository {
    async fn list_for_review(
        &self,
        review_id: Uuid,
    ) -> Result<Vec<Comment>, CommentPersistenceError> {
        let mut comments: Vec<Comment> = self
            .lock()
            .iter()
            .filter(|c| c.review_id == review_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.pub_date);
        Ok(comments)
    }

    async fn find(
        &self,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, CommentPersistenceError> {
        Ok(self
            .lock()
            .iter()
            .find(|c| c.review_id == review_id && c.id == comment_id)
            .cloned())
    }

    async fn insert(&self, comment: &Comment) -> Result<(), CommentPersistenceError> {
        self.lock().push(comment.clone());
        Ok(())
    }

    async fn update(&self, comment: &Comment) -> Result<(), CommentPersistenceError> {
        let mut state = self.lock();
        match state.iter_mut().find(|c| c.id == comment.id) {
            Some(slot) => {
                *slot = comment.clone();
                Ok(())
            }
            None => Err(CommentPersistenceError::query("comment does not exist")),
        }
    }

    async fn delete(
        &self,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> Result<bool, CommentPersistenceError> {
        let mut state = self.lock();
        let before = state.len();
        state.retain(|c| !(c.review_id == review_id && c.id == comment_id));
        Ok(state.len() < before)
    }

    async fn delete_for_review(&self, review_id: Uuid) -> Result<(), CommentPersistenceError> {
        self.lock().retain(|c| c.review_id != review_id);
        Ok(())
    }
}
