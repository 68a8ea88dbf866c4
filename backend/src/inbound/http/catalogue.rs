//! Catalogue handlers: categories, genres, and titles.
//!
//! ```text
//! GET/POST /api/v1/categories  + DELETE /api/v1/categories/{slug}
//! GET/POST /api/v1/genres      + DELETE /api/v1/genres/{slug}
//! GET/POST /api/v1/titles      + GET/PATCH/DELETE /api/v1/titles/{title_id}
//! ```
//!
//! Reads are public; writes require an admin or superuser actor.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::catalogue::{Category, Genre, Slug, Title, TitlePatch};
use crate::domain::{Error, TitleInput};

use super::ApiResult;
use super::actor::RequestActor;
use super::state::HttpState;

/// Request body shared by category and genre creation.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LabelRequest {
    pub name: String,
    pub slug: String,
}

/// Request body for title creation.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TitleRequest {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
}

/// Request body for partial title updates.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TitlePatchRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genre: Option<Vec<String>>,
}

fn parse_slug(value: String) -> ApiResult<Slug> {
    Slug::new(value).map_err(|err| Error::invalid_request(err.to_string()))
}

fn parse_slugs(values: Vec<String>) -> ApiResult<Vec<Slug>> {
    values.into_iter().map(parse_slug).collect()
}

/// List all categories.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses((status = 200, description = "Categories", body = [Category])),
    tags = ["catalogue"],
    operation_id = "listCategories",
    security([])
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    actor: RequestActor,
) -> ApiResult<web::Json<Vec<Category>>> {
    Ok(web::Json(
        state.catalogue.list_categories(&actor.into_inner()).await?,
    ))
}

/// Create a category (admin only).
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = LabelRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    actor: RequestActor,
    payload: web::Json<LabelRequest>,
) -> ApiResult<HttpResponse> {
    let LabelRequest { name, slug } = payload.into_inner();
    let category = state
        .catalogue
        .create_category(&actor.into_inner(), name, parse_slug(slug)?)
        .await?;
    Ok(HttpResponse::Created().json(category))
}

/// Delete a category by slug (admin only).
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown slug", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "deleteCategory"
)]
#[delete("/categories/{slug}")]
pub async fn delete_category(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let slug = parse_slug(path.into_inner())?;
    state
        .catalogue
        .delete_category(&actor.into_inner(), &slug)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List all genres.
#[utoipa::path(
    get,
    path = "/api/v1/genres",
    responses((status = 200, description = "Genres", body = [Genre])),
    tags = ["catalogue"],
    operation_id = "listGenres",
    security([])
)]
#[get("/genres")]
pub async fn list_genres(
    state: web::Data<HttpState>,
    actor: RequestActor,
) -> ApiResult<web::Json<Vec<Genre>>> {
    Ok(web::Json(
        state.catalogue.list_genres(&actor.into_inner()).await?,
    ))
}

/// Create a genre (admin only).
#[utoipa::path(
    post,
    path = "/api/v1/genres",
    request_body = LabelRequest,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "createGenre"
)]
#[post("/genres")]
pub async fn create_genre(
    state: web::Data<HttpState>,
    actor: RequestActor,
    payload: web::Json<LabelRequest>,
) -> ApiResult<HttpResponse> {
    let LabelRequest { name, slug } = payload.into_inner();
    let genre = state
        .catalogue
        .create_genre(&actor.into_inner(), name, parse_slug(slug)?)
        .await?;
    Ok(HttpResponse::Created().json(genre))
}

/// Delete a genre by slug (admin only).
#[utoipa::path(
    delete,
    path = "/api/v1/genres/{slug}",
    params(("slug" = String, Path, description = "Genre slug")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown slug", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "deleteGenre"
)]
#[delete("/genres/{slug}")]
pub async fn delete_genre(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let slug = parse_slug(path.into_inner())?;
    state
        .catalogue
        .delete_genre(&actor.into_inner(), &slug)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List all titles with average ratings.
#[utoipa::path(
    get,
    path = "/api/v1/titles",
    responses((status = 200, description = "Titles", body = [Title])),
    tags = ["catalogue"],
    operation_id = "listTitles",
    security([])
)]
#[get("/titles")]
pub async fn list_titles(
    state: web::Data<HttpState>,
    actor: RequestActor,
) -> ApiResult<web::Json<Vec<Title>>> {
    Ok(web::Json(
        state.catalogue.list_titles(&actor.into_inner()).await?,
    ))
}

/// Fetch one title with its average rating.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}",
    params(("title_id" = Uuid, Path, description = "Title id")),
    responses(
        (status = 200, description = "Title", body = Title),
        (status = 404, description = "Unknown title", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "getTitle",
    security([])
)]
#[get("/titles/{title_id}")]
pub async fn get_title(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Title>> {
    Ok(web::Json(
        state
            .catalogue
            .get_title(&actor.into_inner(), path.into_inner())
            .await?,
    ))
}

/// Create a title (admin only).
///
/// Titles whose release year lies in the future are rejected.
#[utoipa::path(
    post,
    path = "/api/v1/titles",
    request_body = TitleRequest,
    responses(
        (status = 201, description = "Title created", body = Title),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "createTitle"
)]
#[post("/titles")]
pub async fn create_title(
    state: web::Data<HttpState>,
    actor: RequestActor,
    payload: web::Json<TitleRequest>,
) -> ApiResult<HttpResponse> {
    let TitleRequest {
        name,
        year,
        description,
        category,
        genre,
    } = payload.into_inner();
    let input = TitleInput {
        name,
        year,
        description,
        category: category.map(parse_slug).transpose()?,
        genre: parse_slugs(genre)?,
    };
    let title = state
        .catalogue
        .create_title(&actor.into_inner(), input)
        .await?;
    Ok(HttpResponse::Created().json(title))
}

/// Partially update a title (admin only).
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}",
    params(("title_id" = Uuid, Path, description = "Title id")),
    request_body = TitlePatchRequest,
    responses(
        (status = 200, description = "Updated title", body = Title),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown title", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "updateTitle"
)]
#[patch("/titles/{title_id}")]
pub async fn update_title(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<Uuid>,
    payload: web::Json<TitlePatchRequest>,
) -> ApiResult<web::Json<Title>> {
    let TitlePatchRequest {
        name,
        year,
        description,
        category,
        genre,
    } = payload.into_inner();
    let patch = TitlePatch {
        name,
        year,
        description,
        category: category.map(parse_slug).transpose()?,
        genre: genre.map(parse_slugs).transpose()?,
    };
    Ok(web::Json(
        state
            .catalogue
            .update_title(&actor.into_inner(), path.into_inner(), patch)
            .await?,
    ))
}

/// Delete a title (admin only).
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}",
    params(("title_id" = Uuid, Path, description = "Title id")),
    responses(
        (status = 204, description = "Title deleted"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown title", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "deleteTitle"
)]
#[delete("/titles/{title_id}")]
pub async fn delete_title(
    state: web::Data<HttpState>,
    actor: RequestActor,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .catalogue
        .delete_title(&actor.into_inner(), path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
