//! Use-case service for catalogue reads and admin-gated writes.

use std::sync::Arc;

use chrono::Datelike;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::catalogue::{
    Category, CatalogueValidationError, Genre, Slug, Title, TitleDraft, TitlePatch,
};
use crate::domain::policy::{Actor, authorize_catalogue_write, authorize_read};
use crate::domain::ports::{
    CataloguePersistenceError, CatalogueRepository, ReviewPersistenceError, ReviewRepository,
};
use crate::domain::{ApiResult, Error};

/// Unvalidated title-creation payload from the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleInput {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category: Option<Slug>,
    pub genre: Vec<Slug>,
}

/// Use-case service over catalogue and review storage.
///
/// Holds the review repository only to fill title ratings; all review
/// mutations go through [`crate::domain::review_service`].
pub struct CatalogueService {
    catalogue: Arc<dyn CatalogueRepository>,
    reviews: Arc<dyn ReviewRepository>,
    clock: Arc<dyn Clock>,
}

impl CatalogueService {
    /// Wire the service from its collaborators.
    pub fn new(
        catalogue: Arc<dyn CatalogueRepository>,
        reviews: Arc<dyn ReviewRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalogue,
            reviews,
            clock,
        }
    }

    /// List all categories.
    pub async fn list_categories(&self, actor: &Actor) -> ApiResult<Vec<Category>> {
        authorize_read(actor)?;
        self.catalogue
            .list_categories()
            .await
            .map_err(map_catalogue_persistence_error)
    }

    /// Create a category (admin only).
    pub async fn create_category(
        &self,
        actor: &Actor,
        name: String,
        slug: Slug,
    ) -> ApiResult<Category> {
        authorize_catalogue_write(actor)?;
        let category = Category::new(name, slug).map_err(map_validation_error)?;
        self.catalogue
            .insert_category(&category)
            .await
            .map_err(map_catalogue_persistence_error)?;
        Ok(category)
    }

    /// Delete a category by slug (admin only).
    pub async fn delete_category(&self, actor: &Actor, slug: &Slug) -> ApiResult<()> {
        authorize_catalogue_write(actor)?;
        let removed = self
            .catalogue
            .delete_category(slug)
            .await
            .map_err(map_catalogue_persistence_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("no category with this slug"))
        }
    }

    /// List all genres.
    pub async fn list_genres(&self, actor: &Actor) -> ApiResult<Vec<Genre>> {
        authorize_read(actor)?;
        self.catalogue
            .list_genres()
            .await
            .map_err(map_catalogue_persistence_error)
    }

    /// Create a genre (admin only).
    pub async fn create_genre(
        &self,
        actor: &Actor,
        name: String,
        slug: Slug,
    ) -> ApiResult<Genre> {
        authorize_catalogue_write(actor)?;
        let genre = Genre::new(name, slug).map_err(map_validation_error)?;
        self.catalogue
            .insert_genre(&genre)
            .await
            .map_err(map_catalogue_persistence_error)?;
        Ok(genre)
    }

    /// Delete a genre by slug (admin only).
    pub async fn delete_genre(&self, actor: &Actor, slug: &Slug) -> ApiResult<()> {
        authorize_catalogue_write(actor)?;
        let removed = self
            .catalogue
            .delete_genre(slug)
            .await
            .map_err(map_catalogue_persistence_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("no genre with this slug"))
        }
    }

    /// List all titles with their average ratings.
    pub async fn list_titles(&self, actor: &Actor) -> ApiResult<Vec<Title>> {
        authorize_read(actor)?;
        let mut titles = self
            .catalogue
            .list_titles()
            .await
            .map_err(map_catalogue_persistence_error)?;
        let ids: Vec<Uuid> = titles.iter().map(|t| t.id).collect();
        let ratings = self
            .reviews
            .average_scores(&ids)
            .await
            .map_err(map_review_persistence_error)?;
        for title in &mut titles {
            title.rating = ratings.get(&title.id).copied();
        }
        Ok(titles)
    }

    /// Fetch one title with its average rating.
    pub async fn get_title(&self, actor: &Actor, id: Uuid) -> ApiResult<Title> {
        authorize_read(actor)?;
        let mut title = self.find_required(id).await?;
        let ratings = self
            .reviews
            .average_scores(std::slice::from_ref(&id))
            .await
            .map_err(map_review_persistence_error)?;
        title.rating = ratings.get(&id).copied();
        Ok(title)
    }

    /// Create a title (admin only).
    ///
    /// The release-year bound is evaluated against the clock at the moment of
    /// the request.
    pub async fn create_title(&self, actor: &Actor, input: TitleInput) -> ApiResult<Title> {
        authorize_catalogue_write(actor)?;
        let current_year = self.current_year();
        let draft = TitleDraft::new(
            input.name,
            input.year,
            input.description,
            input.category,
            input.genre,
            current_year,
        )
        .map_err(map_validation_error)?;
        self.catalogue
            .insert_title(&draft)
            .await
            .map_err(map_catalogue_persistence_error)
    }

    /// Partially update a title (admin only).
    pub async fn update_title(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: TitlePatch,
    ) -> ApiResult<Title> {
        authorize_catalogue_write(actor)?;
        patch
            .validate(self.current_year())
            .map_err(map_validation_error)?;
        let updated = self
            .catalogue
            .update_title(id, &patch)
            .await
            .map_err(map_catalogue_persistence_error)?
            .ok_or_else(|| Error::not_found("no title with this id"))?;
        self.with_rating(updated).await
    }

    /// Delete a title (admin only).
    pub async fn delete_title(&self, actor: &Actor, id: Uuid) -> ApiResult<()> {
        authorize_catalogue_write(actor)?;
        let removed = self
            .catalogue
            .delete_title(id)
            .await
            .map_err(map_catalogue_persistence_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("no title with this id"))
        }
    }

    /// Whether a title exists; used by the review service for 404 scoping.
    pub(crate) async fn title_exists(&self, id: Uuid) -> ApiResult<bool> {
        Ok(self
            .catalogue
            .find_title(id)
            .await
            .map_err(map_catalogue_persistence_error)?
            .is_some())
    }

    fn current_year(&self) -> i32 {
        self.clock.utc().year()
    }

    async fn find_required(&self, id: Uuid) -> ApiResult<Title> {
        self.catalogue
            .find_title(id)
            .await
            .map_err(map_catalogue_persistence_error)?
            .ok_or_else(|| Error::not_found("no title with this id"))
    }

    async fn with_rating(&self, mut title: Title) -> ApiResult<Title> {
        let ratings = self
            .reviews
            .average_scores(std::slice::from_ref(&title.id))
            .await
            .map_err(map_review_persistence_error)?;
        title.rating = ratings.get(&title.id).copied();
        Ok(title)
    }
}

fn map_validation_error(err: CatalogueValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

pub(crate) fn map_catalogue_persistence_error(err: CataloguePersistenceError) -> Error {
    match err {
        CataloguePersistenceError::Connection { message } => Error::service_unavailable(message),
        CataloguePersistenceError::Query { message } => Error::internal(message),
        CataloguePersistenceError::DuplicateSlug => {
            Error::invalid_request("this slug is already in use")
        }
        CataloguePersistenceError::MissingCategory { slug } => {
            Error::invalid_request(format!("unknown category slug: {slug}"))
        }
        CataloguePersistenceError::MissingGenre { slug } => {
            Error::invalid_request(format!("unknown genre slug: {slug}"))
        }
    }
}

pub(crate) fn map_review_persistence_error(err: ReviewPersistenceError) -> Error {
    match err {
        ReviewPersistenceError::Connection { message } => Error::service_unavailable(message),
        ReviewPersistenceError::Query { message } => Error::internal(message),
        ReviewPersistenceError::DuplicateReview => {
            Error::invalid_request("you have already reviewed this title")
        }
    }
}

#[cfg(test)]
mod tests;
