//! Diesel-backed `ReviewRepository` adapter.
//!
//! The `reviews_title_author_unique` constraint arbitrates the duplicate
//! check/insert race; its violation maps to
//! [`ReviewPersistenceError::DuplicateReview`].

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel::sql_types::{Double, Nullable};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ReviewPersistenceError, ReviewRepository};
use crate::domain::review::{Review, Score};

use super::models::{NewReviewRow, ReviewRow};
use super::pool::DbPool;
use super::schema::reviews;

/// Diesel-backed review repository.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(err: super::pool::PoolError) -> ReviewPersistenceError {
    ReviewPersistenceError::connection(err.to_string())
}

fn map_diesel_error(err: diesel::result::Error) -> ReviewPersistenceError {
    if let diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &err {
        if info.constraint_name() == Some("reviews_title_author_unique") {
            return ReviewPersistenceError::DuplicateReview;
        }
    }
    ReviewPersistenceError::query(err.to_string())
}

fn row_to_review(row: ReviewRow) -> Result<Review, ReviewPersistenceError> {
    let score = Score::new(row.score)
        .map_err(|err| ReviewPersistenceError::query(format!("stored score invalid: {err}")))?;
    Ok(Review {
        id: row.id,
        title_id: row.title_id,
        author_id: row.author_id,
        text: row.text,
        score,
        pub_date: row.pub_date,
    })
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn list_for_title(
        &self,
        title_id: Uuid,
    ) -> Result<Vec<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = reviews::table
            .filter(reviews::title_id.eq(title_id))
            .order(reviews::pub_date.asc())
            .select(ReviewRow::as_select())
            .load::<ReviewRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_review).collect()
    }

    async fn find(
        &self,
        title_id: Uuid,
        review_id: Uuid,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = reviews::table
            .filter(reviews::title_id.eq(title_id))
            .filter(reviews::id.eq(review_id))
            .select(ReviewRow::as_select())
            .first::<ReviewRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_review).transpose()
    }

    async fn find_by_title_and_author(
        &self,
        title_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = reviews::table
            .filter(reviews::title_id.eq(title_id))
            .filter(reviews::author_id.eq(author_id))
            .select(ReviewRow::as_select())
            .first::<ReviewRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_review).transpose()
    }

    async fn insert(&self, review: &Review) -> Result<(), ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(reviews::table)
            .values(NewReviewRow {
                id: review.id,
                title_id: review.title_id,
                author_id: review.author_id,
                text: &review.text,
                score: review.score.value(),
                pub_date: review.pub_date,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, review: &Review) -> Result<(), ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(reviews::table.find(review.id))
            .set((
                reviews::text.eq(&review.text),
                reviews::score.eq(review.score.value()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(ReviewPersistenceError::query("review does not exist"));
        }
        Ok(())
    }

    async fn delete(
        &self,
        title_id: Uuid,
        review_id: Uuid,
    ) -> Result<bool, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            reviews::table
                .filter(reviews::title_id.eq(title_id))
                .filter(reviews::id.eq(review_id)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn average_scores(
        &self,
        title_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, f64>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(Uuid, Option<f64>)> = reviews::table
            .filter(reviews::title_id.eq_any(title_ids))
            .group_by(reviews::title_id)
            .select((reviews::title_id, sql::<Nullable<Double>>("avg(score)::float8")))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .filter_map(|(id, avg)| avg.map(|value| (id, value)))
            .collect())
    }
}
