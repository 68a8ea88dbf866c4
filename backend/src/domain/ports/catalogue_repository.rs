//! Port abstraction for catalogue persistence adapters.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::catalogue::{Category, Genre, Slug, Title, TitleDraft, TitlePatch};

/// Persistence errors raised by catalogue repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CataloguePersistenceError {
    /// Repository connection could not be established.
    #[error("catalogue repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("catalogue repository query failed: {message}")]
    Query { message: String },
    /// Insert violated a slug unique constraint.
    #[error("slug is already taken")]
    DuplicateSlug,
    /// A referenced category slug does not exist.
    #[error("unknown category slug: {slug}")]
    MissingCategory { slug: String },
    /// A referenced genre slug does not exist.
    #[error("unknown genre slug: {slug}")]
    MissingGenre { slug: String },
}

impl CataloguePersistenceError {
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

    /// Create a missing-category error for the given slug.
    pub fn missing_category(slug: impl Into<String>) -> Self {
        Self::MissingCategory { slug: slug.into() }
    }

    /// Create a missing-genre error for the given slug.
    pub fn missing_genre(slug: impl Into<String>) -> Self {
        Self::MissingGenre { slug: slug.into() }
    }
}

/// Port for category, genre, and title storage.
///
/// Titles returned from reads carry `rating: None`; the catalogue service
/// fills ratings from the review repository so the two stores stay decoupled.
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// List all categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, CataloguePersistenceError>;

    /// Insert a new category.
    async fn insert_category(&self, category: &Category)
    -> Result<(), CataloguePersistenceError>;

    /// Remove a category by slug, reporting whether a row existed.
    ///
    /// Titles keep running without a category afterwards.
    async fn delete_category(&self, slug: &Slug) -> Result<bool, CataloguePersistenceError>;

    /// List all genres ordered by name.
    async fn list_genres(&self) -> Result<Vec<Genre>, CataloguePersistenceError>;

    /// Insert a new genre.
    async fn insert_genre(&self, genre: &Genre) -> Result<(), CataloguePersistenceError>;

    /// Remove a genre by slug, reporting whether a row existed.
    async fn delete_genre(&self, slug: &Slug) -> Result<bool, CataloguePersistenceError>;

    /// List all titles ordered by name.
    async fn list_titles(&self) -> Result<Vec<Title>, CataloguePersistenceError>;

    /// Fetch a title by identifier.
    async fn find_title(&self, id: Uuid) -> Result<Option<Title>, CataloguePersistenceError>;

    /// Insert a title, resolving category and genre slugs.
    async fn insert_title(&self, draft: &TitleDraft) -> Result<Title, CataloguePersistenceError>;

    /// Apply a partial update, returning the new state when the title exists.
    async fn update_title(
        &self,
        id: Uuid,
        patch: &TitlePatch,
    ) -> Result<Option<Title>, CataloguePersistenceError>;

    /// Remove a title by identifier, reporting whether a row existed.
    async fn delete_title(&self, id: Uuid) -> Result<bool, CataloguePersistenceError>;
}

#[derive(Debug, Default)]
struct FixtureCatalogueState {
    categories: Vec<Category>,
    genres: Vec<Genre>,
    titles: Vec<Title>,
}

/// In-memory catalogue repository used by tests and database-less deployments.
#[derive(Debug, Default)]
pub struct FixtureCatalogueRepository {
    state: Mutex<FixtureCatalogueState>,
}

impl FixtureCatalogueRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FixtureCatalogueState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn resolve_refs(
        state: &FixtureCatalogueState,
        category: Option<&Slug>,
        genre: &[Slug],
    ) -> Result<(Option<Category>, Vec<Genre>), CataloguePersistenceError> {
        let category = match category {
            Some(slug) => Some(
                state
                    .categories
                    .iter()
                    .find(|c| c.slug == *slug)
                    .cloned()
                    .ok_or_else(|| CataloguePersistenceError::missing_category(slug.as_ref()))?,
            ),
            None => None,
        };
        let mut genres = Vec::with_capacity(genre.len());
        for slug in genre {
            let found = state
                .genres
                .iter()
                .find(|g| g.slug == *slug)
                .cloned()
                .ok_or_else(|| CataloguePersistenceError::missing_genre(slug.as_ref()))?;
            genres.push(found);
        }
        Ok((category, genres))
    }
}

#[async_trait]
impl CatalogueRepository for FixtureCatalogueRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, CataloguePersistenceError> {
        let mut categories = self.lock().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn insert_category(
        &self,
        category: &Category,
    ) -> Result<(), CataloguePersistenceError> {
        let mut state = self.lock();
        if state.categories.iter().any(|c| c.slug == category.slug) {
            return Err(CataloguePersistenceError::DuplicateSlug);
        }
        state.categories.push(category.clone());
        Ok(())
    }

    async fn delete_category(&self, slug: &Slug) -> Result<bool, CataloguePersistenceError> {
        let mut state = self.lock();
        let before = state.categories.len();
        state.categories.retain(|c| c.slug != *slug);
        let removed = state.categories.len() < before;
        if removed {
            for title in &mut state.titles {
                if title.category.as_ref().is_some_and(|c| c.slug == *slug) {
                    title.category = None;
                }
            }
        }
        Ok(removed)
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, CataloguePersistenceError> {
        let mut genres = self.lock().genres.clone();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn insert_genre(&self, genre: &Genre) -> Result<(), CataloguePersistenceError> {
        let mut state = self.lock();
        if state.genres.iter().any(|g| g.slug == genre.slug) {
            return Err(CataloguePersistenceError::DuplicateSlug);
        }
        state.genres.push(genre.clone());
        Ok(())
    }

    async fn delete_genre(&self, slug: &Slug) -> Result<bool, CataloguePersistenceError> {
        let mut state = self.lock();
        let before = state.genres.len();
        state.genres.retain(|g| g.slug != *slug);
        let removed = state.genres.len() < before;
        if removed {
            for title in &mut state.titles {
                title.genre.retain(|g| g.slug != *slug);
            }
        }
        Ok(removed)
    }

    async fn list_titles(&self) -> Result<Vec<Title>, CataloguePersistenceError> {
        let mut titles = self.lock().titles.clone();
        titles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(titles)
    }

    async fn find_title(&self, id: Uuid) -> Result<Option<Title>, CataloguePersistenceError> {
        Ok(self.lock().titles.iter().find(|t| t.id == id).cloned())
    }

    async fn insert_title(
        &self,
        draft: &TitleDraft,
    ) -> Result<Title, CataloguePersistenceError> {
        let mut state = self.lock();
        let (category, genres) =
            Self::resolve_refs(&state, draft.category.as_ref(), &draft.genre)?;
        let title = Title {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            year: draft.year,
            description: draft.description.clone(),
            category,
            genre: genres,
            rating: None,
        };
        state.titles.push(title.clone());
        Ok(title)
    }

    async fn update_title(
        &self,
        id: Uuid,
        patch: &TitlePatch,
    ) -> Result<Option<Title>, CataloguePersistenceError> {
        let mut state = self.lock();
        let Some(position) = state.titles.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let (category, genres) = match (&patch.category, &patch.genre) {
            (category @ Some(_), Some(genre)) => {
                let (c, g) = Self::resolve_refs(&state, category.as_ref(), genre)?;
                (c.map(Some), Some(g))
            }
            (category @ Some(_), None) => {
                let (c, _) = Self::resolve_refs(&state, category.as_ref(), &[])?;
                (c.map(Some), None)
            }
            (None, Some(genre)) => {
                let (_, g) = Self::resolve_refs(&state, None, genre)?;
                (None, Some(g))
            }
            (None, None) => (None, None),
        };
        let title = state
            .titles
            .get_mut(position)
            .ok_or_else(|| CataloguePersistenceError::query("title vanished during update"))?;
        if let Some(name) = &patch.name {
            title.name.clone_from(name);
        }
        if let Some(year) = patch.year {
            title.year = year;
        }
        if let Some(description) = &patch.description {
            title.description = Some(description.clone());
        }
        if let Some(resolved) = category {
            title.category = resolved;
        }
        if let Some(resolved) = genres {
            title.genre = resolved;
        }
        Ok(Some(title.clone()))
    }

    async fn delete_title(&self, id: Uuid) -> Result<bool, CataloguePersistenceError> {
        let mut state = self.lock();
        let before = state.titles.len();
        state.titles.retain(|t| t.id != id);
        Ok(state.titles.len() < before)
    }
}
