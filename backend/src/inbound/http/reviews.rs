//! Review and comment handlers nested under titles.
//!
//! ```text
//! GET/POST /api/v1/titles/{title_id}/reviews
//! GET/PATCH/DELETE /api/v1/titles/{title_id}/reviews/{review_id}
//! GET/POST .../reviews/{review_id}/comments
//! GET/PATCH/DELETE .../comments/{comment_id}
//! ```
//!
//! The author is always the authenticated actor and the parent resources come
//! from the URL path; neither is accepted from the request body.

use std::collections::HashMap;

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::review::{
    Comment, CommentDraft, Review, ReviewDraft, ReviewPatch, Score,
};
use crate::domain::signup::map_account_persistence_error;
use crate::domain::Error;

use super::ApiResult;
use super::actor::RequestActor;
use super::state::HttpState;

/// Review representation returned by the API.
///
/// `author` is the author's username; accounts removed since publication
/// render as `null`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ReviewDto {
    pub id: Uuid,
    pub title: Uuid,
    pub author: Option<String>,
    pub text: String,
    pub score: i32,
    pub pub_date: DateTime<Utc>,
}

/// Comment representation returned by the API.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CommentDto {
    pub id: Uuid,
    pub author: Option<String>,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

/// Request body for review creation.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ReviewRequest {
    pub text: String,
    pub score: i32,
}

/// Request body for partial review updates.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ReviewPatchRequest {
    pub text: Option<String>,
    pub score: Option<i32>,
}

/// Request body for comment creation and updates.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CommentRequest {
    pub text: String,
}

struct AuthorNames<'a> {
    state: &'a HttpState,
    cache: HashMap<Uuid, Option<String>>,
}

impl<'a> AuthorNames<'a> {
    fn new(state: &'a HttpState) -> Self {
        Self {
            state,
            cache: HashMap::new(),
        }
    }

    async fn resolve(&mut self, author_id: Uuid) -> ApiResult<Option<String>> {
        if let Some(name) = self.cache.get(&author_id) {
            return Ok(name.clone());
        }
        let name = self
            .state
            .accounts
            .find_by_id(author_id)
            .await
            .map_err(map_account_persistence_error)?
            .map(|account| String::from(account.username));
        self.cache.insert(author_id, name.clone());
        Ok(name)
    }

    async fn review_dto(&mut self, review: Review) -> ApiResult<ReviewDto> {
        let author = self.resolve(review.author_id).await?;
        Ok(ReviewDto {
            id: review.id,
            title: review.title_id,
            author,
            text: review.text,
            score: review.score.value(),
            pub_date: review.pub_date,
        })
    }

    async fn comment_dto(&mut self, comment: Comment) -> ApiResult<CommentDto> {
        let author = self.resolve(comment.author_id).await?;
        Ok(CommentDto {
            id: comment.id,
            author,
            text: comment.text,
            pub_date: comment.pub_date,
        })
    }
}

fn parse_review_draft(payload: ReviewRequest) -> ApiResult<ReviewDraft> {
    ReviewDraft::new(payload.text, payload.score)
        .map_err(|err| Error::invalid_request(err.to_string()))
}

fn parse_review_patch(payload: ReviewPatchRequest) -> ApiResult<ReviewPatch> {
    let score = payload
        .score
        .map(Score::new)
        .transpose()
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    Ok(ReviewPatch {
        text: payload.text,
        score,
    })
}

fn parse_comment_draft(payload: CommentRequest) -> ApiResult<CommentDraft> {
    CommentDraft::new(payload.text).map_err(|err| Error::invalid_request(err.to_string()))
}

/// List reviews under a title.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews",
    params(("title_id" = Uuid, Path, description = "Title id")),
    responses(
        (status = 200, description = "Reviews", body = [ReviewDto]),
        (status = 404, description = "Unknown title", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "listReviews",
    security([])
)]
#[get("/titles/{title_id}/reviews")]
pub async fn list_reviews(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Vec<ReviewDto>>> {
    let reviews = state
        .reviews
        .list(&actor.into_inner(), path.into_inner())
        .await?;
    let mut names = AuthorNames::new(&state);
    let mut dtos = Vec::with_capacity(reviews.len());
    for review in reviews {
        dtos.push(names.review_dto(review).await?);
    }
    Ok(web::Json(dtos))
}

/// Publish a review for a title.
///
/// One review per (title, author): a second submission by the same author is
/// rejected with a validation error.
#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews",
    params(("title_id" = Uuid, Path, description = "Title id")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review published", body = ReviewDto),
        (status = 400, description = "Validation failure or duplicate review", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "Unknown title", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
#[post("/titles/{title_id}/reviews")]
pub async fn create_review(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<Uuid>,
    payload: web::Json<ReviewRequest>,
) -> ApiResult<HttpResponse> {
    let draft = parse_review_draft(payload.into_inner())?;
    let review = state
        .reviews
        .create(&actor.into_inner(), path.into_inner(), draft)
        .await?;
    let dto = AuthorNames::new(&state).review_dto(review).await?;
    Ok(HttpResponse::Created().json(dto))
}

/// Fetch one review under a title.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = Uuid, Path, description = "Title id"),
        ("review_id" = Uuid, Path, description = "Review id")
    ),
    responses(
        (status = 200, description = "Review", body = ReviewDto),
        (status = 404, description = "Unknown title or review", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "getReview",
    security([])
)]
#[get("/titles/{title_id}/reviews/{review_id}")]
pub async fn get_review(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<web::Json<ReviewDto>> {
    let (title_id, review_id) = path.into_inner();
    let review = state
        .reviews
        .get(&actor.into_inner(), title_id, review_id)
        .await?;
    Ok(web::Json(AuthorNames::new(&state).review_dto(review).await?))
}

/// Partially update a review; author, moderator, or admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = Uuid, Path, description = "Title id"),
        ("review_id" = Uuid, Path, description = "Review id")
    ),
    request_body = ReviewPatchRequest,
    responses(
        (status = 200, description = "Updated review", body = ReviewDto),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown title or review", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "updateReview"
)]
#[patch("/titles/{title_id}/reviews/{review_id}")]
pub async fn update_review(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<(Uuid, Uuid)>,
    payload: web::Json<ReviewPatchRequest>,
) -> ApiResult<web::Json<ReviewDto>> {
    let (title_id, review_id) = path.into_inner();
    let patch = parse_review_patch(payload.into_inner())?;
    let review = state
        .reviews
        .patch(&actor.into_inner(), title_id, review_id, patch)
        .await?;
    Ok(web::Json(AuthorNames::new(&state).review_dto(review).await?))
}

/// Delete a review; author, moderator, or admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = Uuid, Path, description = "Title id"),
        ("review_id" = Uuid, Path, description = "Review id")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown title or review", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "deleteReview"
)]
#[delete("/titles/{title_id}/reviews/{review_id}")]
pub async fn delete_review(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let (title_id, review_id) = path.into_inner();
    state
        .reviews
        .delete(&actor.into_inner(), title_id, review_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List comments under a review.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
    params(
        ("title_id" = Uuid, Path, description = "Title id"),
        ("review_id" = Uuid, Path, description = "Review id")
    ),
    responses(
        (status = 200, description = "Comments", body = [CommentDto]),
        (status = 404, description = "Unknown title or review", body = Error)
    ),
    tags = ["comments"],
    operation_id = "listComments",
    security([])
)]
#[get("/titles/{title_id}/reviews/{review_id}/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<web::Json<Vec<CommentDto>>> {
    let (title_id, review_id) = path.into_inner();
    let comments = state
        .reviews
        .list_comments(&actor.into_inner(), title_id, review_id)
        .await?;
    let mut names = AuthorNames::new(&state);
    let mut dtos = Vec::with_capacity(comments.len());
    for comment in comments {
        dtos.push(names.comment_dto(comment).await?);
    }
    Ok(web::Json(dtos))
}

/// Publish a comment under a review.
#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
    params(
        ("title_id" = Uuid, Path, description = "Title id"),
        ("review_id" = Uuid, Path, description = "Review id")
    ),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment published", body = CommentDto),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "Unknown title or review", body = Error)
    ),
    tags = ["comments"],
    operation_id = "createComment"
)]
#[post("/titles/{title_id}/reviews/{review_id}/comments")]
pub async fn create_comment(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<(Uuid, Uuid)>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let (title_id, review_id) = path.into_inner();
    let draft = parse_comment_draft(payload.into_inner())?;
    let comment = state
        .reviews
        .create_comment(&actor.into_inner(), title_id, review_id, draft)
        .await?;
    let dto = AuthorNames::new(&state).comment_dto(comment).await?;
    Ok(HttpResponse::Created().json(dto))
}

/// Fetch one comment under a review.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = Uuid, Path, description = "Title id"),
        ("review_id" = Uuid, Path, description = "Review id"),
        ("comment_id" = Uuid, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment", body = CommentDto),
        (status = 404, description = "Unknown title, review, or comment", body = Error)
    ),
    tags = ["comments"],
    operation_id = "getComment",
    security([])
)]
#[get("/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
pub async fn get_comment(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<web::Json<CommentDto>> {
    let (title_id, review_id, comment_id) = path.into_inner();
    let comment = state
        .reviews
        .get_comment(&actor.into_inner(), title_id, review_id, comment_id)
        .await?;
    Ok(web::Json(AuthorNames::new(&state).comment_dto(comment).await?))
}

/// Update a comment; author, moderator, or admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = Uuid, Path, description = "Title id"),
        ("review_id" = Uuid, Path, description = "Review id"),
        ("comment_id" = Uuid, Path, description = "Comment id")
    ),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Updated comment", body = CommentDto),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown title, review, or comment", body = Error)
    ),
    tags = ["comments"],
    operation_id = "updateComment"
)]
#[patch("/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
pub async fn update_comment(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<(Uuid, Uuid, Uuid)>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<web::Json<CommentDto>> {
    let (title_id, review_id, comment_id) = path.into_inner();
    let draft = parse_comment_draft(payload.into_inner())?;
    let comment = state
        .reviews
        .patch_comment(&actor.into_inner(), title_id, review_id, comment_id, draft)
        .await?;
    Ok(web::Json(AuthorNames::new(&state).comment_dto(comment).await?))
}

/// Delete a comment; author, moderator, or admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = Uuid, Path, description = "Title id"),
        ("review_id" = Uuid, Path, description = "Review id"),
        ("comment_id" = Uuid, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown title, review, or comment", body = Error)
    ),
    tags = ["comments"],
    operation_id = "deleteComment"
)]
#[delete("/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let (title_id, review_id, comment_id) = path.into_inner();
    state
        .reviews
        .delete_comment(&actor.into_inner(), title_id, review_id, comment_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
