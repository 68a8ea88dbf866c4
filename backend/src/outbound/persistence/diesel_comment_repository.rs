//! Diesel-backed `CommentRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CommentPersistenceError, CommentRepository};
use crate::domain::review::Comment;

use super::models::{CommentRow, NewCommentRow};
use super::pool::DbPool;
use super::schema::comments;

/// Diesel-backed comment repository.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(err: super::pool::PoolError) -> CommentPersistenceError {
    CommentPersistenceError::connection(err.to_string())
}

fn map_diesel_error(err: diesel::result::Error) -> CommentPersistenceError {
    CommentPersistenceError::query(err.to_string())
}

fn row_to_comment(row: CommentRow) -> Comment {
    Comment {
        id: row.id,
        review_id: row.review_id,
        author_id: row.author_id,
        text: row.text,
        pub_date: row.pub_date,
    }
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn list_for_review(
        &self,
        review_id: Uuid,
    ) -> Result<Vec<Comment>, CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = comments::table
            .filter(comments::review_id.eq(review_id))
            .order(comments::pub_date.asc())
            .select(CommentRow::as_select())
            .load::<CommentRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_comment).collect())
    }

    async fn find(
        &self,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = comments::table
            .filter(comments::review_id.eq(review_id))
            .filter(comments::id.eq(comment_id))
            .select(CommentRow::as_select())
            .first::<CommentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_comment))
    }

    async fn insert(&self, comment: &Comment) -> Result<(), CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(comments::table)
            .values(NewCommentRow {
                id: comment.id,
                review_id: comment.review_id,
                author_id: comment.author_id,
                text: &comment.text,
                pub_date: comment.pub_date,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, comment: &Comment) -> Result<(), CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(comments::table.find(comment.id))
            .set(comments::text.eq(&comment.text))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(CommentPersistenceError::query("comment does not exist"));
        }
        Ok(())
    }

    async fn delete(
        &self,
        review_id: Uuid,
        comment_id: Uuid,
    ) -> Result<bool, CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            comments::table
                .filter(comments::review_id.eq(review_id))
                .filter(comments::id.eq(comment_id)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn delete_for_review(&self, review_id: Uuid) -> Result<(), CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(comments::table.filter(comments::review_id.eq(review_id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
