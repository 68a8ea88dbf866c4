//! Use-case service for reviews and comments.
//!
//! Owns the one-review-per-(title, author) invariant: creation runs an
//! advisory lookup first, and the storage unique constraint arbitrates the
//! remaining check/insert race. Both paths surface the same duplicate-review
//! validation error.

use std::sync::Arc;

use mockable::Clock;
use uuid::Uuid;

use crate::domain::catalogue_service::{CatalogueService, map_review_persistence_error};
use crate::domain::policy::{
    Actor, authorize_contribution_create, authorize_contribution_edit, authorize_read,
};
use crate::domain::ports::{CommentPersistenceError, CommentRepository, ReviewRepository};
use crate::domain::review::{
    Comment, CommentDraft, Review, ReviewDraft, ReviewPatch, ReviewValidationError,
};
use crate::domain::{ApiResult, Error};

/// Use-case service over review and comment storage.
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    comments: Arc<dyn CommentRepository>,
    catalogue: Arc<CatalogueService>,
    clock: Arc<dyn Clock>,
}

impl ReviewService {
    /// Wire the service from its collaborators.
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        comments: Arc<dyn CommentRepository>,
        catalogue: Arc<CatalogueService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reviews,
            comments,
            catalogue,
            clock,
        }
    }

    /// List reviews under a title.
    pub async fn list(&self, actor: &Actor, title_id: Uuid) -> ApiResult<Vec<Review>> {
        authorize_read(actor)?;
        self.require_title(title_id).await?;
        self.reviews
            .list_for_title(title_id)
            .await
            .map_err(map_review_persistence_error)
    }

    /// Fetch one review under a title.
    pub async fn get(&self, actor: &Actor, title_id: Uuid, review_id: Uuid) -> ApiResult<Review> {
        authorize_read(actor)?;
        self.require_title(title_id).await?;
        self.find_required(title_id, review_id).await
    }

    /// Publish a review; the author comes from the actor, the title from the
    /// URL path.
    pub async fn create(
        &self,
        actor: &Actor,
        title_id: Uuid,
        draft: ReviewDraft,
    ) -> ApiResult<Review> {
        authorize_contribution_create(actor)?;
        let author = actor.require_account()?;
        self.require_title(title_id).await?;

        // Advisory fast path; the unique constraint has the final word.
        let existing = self
            .reviews
            .find_by_title_and_author(title_id, author.id)
            .await
            .map_err(map_review_persistence_error)?;
        if existing.is_some() {
            return Err(duplicate_review());
        }

        let review = Review {
            id: Uuid::new_v4(),
            title_id,
            author_id: author.id,
            text: draft.text,
            score: draft.score,
            pub_date: self.clock.utc(),
        };
        self.reviews
            .insert(&review)
            .await
            .map_err(map_review_persistence_error)?;
        Ok(review)
    }

    /// Partially update a review; author, moderator, or admin only.
    pub async fn patch(
        &self,
        actor: &Actor,
        title_id: Uuid,
        review_id: Uuid,
        patch: ReviewPatch,
    ) -> ApiResult<Review> {
        self.require_title(title_id).await?;
        let mut review = self.find_required(title_id, review_id).await?;
        authorize_contribution_edit(actor, review.author_id)?;
        patch.validate().map_err(map_validation_error)?;
        if let Some(text) = patch.text {
            review.text = text;
        }
        if let Some(score) = patch.score {
            review.score = score;
        }
        self.reviews
            .update(&review)
            .await
            .map_err(map_review_persistence_error)?;
        Ok(review)
    }

    /// Delete a review; author, moderator, or admin only.
    pub async fn delete(&self, actor: &Actor, title_id: Uuid, review_id: Uuid) -> ApiResult<()> {
        self.require_title(title_id).await?;
        let review = self.find_required(title_id, review_id).await?;
        authorize_contribution_edit(actor, review.author_id)?;
        let removed = self
            .reviews
            .delete(title_id, review_id)
            .await
            .map_err(map_review_persistence_error)?;
        if !removed {
            return Err(Error::not_found("no review with this id"));
        }
        self.comments
            .delete_for_review(review_id)
            .await
            .map_err(map_comment_persistence_error)
    }

    /// List comments under a review.
    pub async fn list_comments(
        &self,
        actor: &Actor,
        title_id: Uuid,
        review_id: Uuid,
    ) -> ApiResult<Vec<Comment>> {
        authorize_read(actor)?;
        self.require_title(title_id).await?;
        self.find_required(title_id, review_id).await?;
        self.comments
            .list_for_review(review_id)
            .await
            .map_err(map_comment_persistence_error)
    }

    /// Fetch one comment under a review.
    pub async fn get_comment(
        &self,
        actor: &Actor,
        title_id: Uuid,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> ApiResult<Comment> {
        authorize_read(actor)?;
        self.require_title(title_id).await?;
        self.find_required(title_id, review_id).await?;
        self.find_comment_required(review_id, comment_id).await
    }

    /// Publish a comment; the author comes from the actor, the review from
    /// the URL path.
    pub async fn create_comment(
        &self,
        actor: &Actor,
        title_id: Uuid,
        review_id: Uuid,
        draft: CommentDraft,
    ) -> ApiResult<Comment> {
        authorize_contribution_create(actor)?;
        let author = actor.require_account()?;
        self.require_title(title_id).await?;
        self.find_required(title_id, review_id).await?;

        let comment = Comment {
            id: Uuid::new_v4(),
            review_id,
            author_id: author.id,
            text: draft.text,
            pub_date: self.clock.utc(),
        };
        self.comments
            .insert(&comment)
            .await
            .map_err(map_comment_persistence_error)?;
        Ok(comment)
    }

    /// Partially update a comment; author, moderator, or admin only.
    pub async fn patch_comment(
        &self,
        actor: &Actor,
        title_id: Uuid,
        review_id: Uuid,
        comment_id: Uuid,
        draft: CommentDraft,
    ) -> ApiResult<Comment> {
        self.require_title(title_id).await?;
        self.find_required(title_id, review_id).await?;
        let mut comment = self.find_comment_required(review_id, comment_id).await?;
        authorize_contribution_edit(actor, comment.author_id)?;
        comment.text = draft.text;
        self.comments
            .update(&comment)
            .await
            .map_err(map_comment_persistence_error)?;
        Ok(comment)
    }

    /// Delete a comment; author, moderator, or admin only.
    pub async fn delete_comment(
        &self,
        actor: &Actor,
        title_id: Uuid,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> ApiResult<()> {
        self.require_title(title_id).await?;
        self.find_required(title_id, review_id).await?;
        let comment = self.find_comment_required(review_id, comment_id).await?;
        authorize_contribution_edit(actor, comment.author_id)?;
        let removed = self
            .comments
            .delete(review_id, comment_id)
            .await
            .map_err(map_comment_persistence_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("no comment with this id"))
        }
    }

    async fn require_title(&self, title_id: Uuid) -> ApiResult<()> {
        if self.catalogue.title_exists(title_id).await? {
            Ok(())
        } else {
            Err(Error::not_found("no title with this id"))
        }
    }

    async fn find_required(&self, title_id: Uuid, review_id: Uuid) -> ApiResult<Review> {
        self.reviews
            .find(title_id, review_id)
            .await
            .map_err(map_review_persistence_error)?
            .ok_or_else(|| Error::not_found("no review with this id"))
    }

    async fn find_comment_required(
        &self,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> ApiResult<Comment> {
        self.comments
            .find(review_id, comment_id)
            .await
            .map_err(map_comment_persistence_error)?
            .ok_or_else(|| Error::not_found("no comment with this id"))
    }
}

fn duplicate_review() -> Error {
    Error::invalid_request("you have already reviewed this title")
}

fn map_validation_error(err: ReviewValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

fn map_comment_persistence_error(err: CommentPersistenceError) -> Error {
    match err {
        CommentPersistenceError::Connection { message } => Error::service_unavailable(message),
        CommentPersistenceError::Query { message } => Error::internal(message),
    }
}
