//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. They exist solely to satisfy Diesel's type requirements for
//! queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{accounts, categories, comments, genres, reviews, title_genres, titles};

/// Row struct for reading from the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_superuser: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub code_issued_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field for audit support")]
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating account records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub is_superuser: bool,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub code_issued_at: DateTime<Utc>,
}

/// Changeset struct for updating account records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = accounts)]
pub(crate) struct AccountUpdate<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub is_superuser: bool,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub code_issued_at: DateTime<Utc>,
}

/// Row struct shared by the categories and genres tables.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub slug: String,
    pub name: String,
}

/// Insertable struct for category records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = categories)]
pub(crate) struct NewCategoryRow<'a> {
    pub slug: &'a str,
    pub name: &'a str,
}

/// Row struct for reading from the genres table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = genres)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GenreRow {
    pub slug: String,
    pub name: String,
}

/// Insertable struct for genre records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = genres)]
pub(crate) struct NewGenreRow<'a> {
    pub slug: &'a str,
    pub name: &'a str,
}

/// Row struct for reading from the titles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = titles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TitleRow {
    pub id: Uuid,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_slug: Option<String>,
    #[expect(dead_code, reason = "schema field for audit support")]
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for title records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = titles)]
pub(crate) struct NewTitleRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub year: i32,
    pub description: Option<&'a str>,
    pub category_slug: Option<&'a str>,
}

/// Insertable struct for the title/genre join table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = title_genres)]
pub(crate) struct NewTitleGenreRow<'a> {
    pub title_id: Uuid,
    pub genre_slug: &'a str,
}

/// Row struct for reading from the reviews table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub title_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub score: i32,
    pub pub_date: DateTime<Utc>,
}

/// Insertable struct for review records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub id: Uuid,
    pub title_id: Uuid,
    pub author_id: Uuid,
    pub text: &'a str,
    pub score: i32,
    pub pub_date: DateTime<Utc>,
}

/// Row struct for reading from the comments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub review_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

/// Insertable struct for comment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub id: Uuid,
    pub review_id: Uuid,
    pub author_id: Uuid,
    pub text: &'a str,
    pub pub_date: DateTime<Utc>,
}
