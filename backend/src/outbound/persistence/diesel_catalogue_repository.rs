//! Diesel-backed `CatalogueRepository` adapter.
//!
//! Title reads assemble the aggregate from three queries (titles, their
//! categories, their genre links); writes that touch the join table run in a
//! transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::catalogue::{Category, Genre, Slug, Title, TitleDraft, TitlePatch};
use crate::domain::ports::{CataloguePersistenceError, CatalogueRepository};

use super::models::{
    CategoryRow, GenreRow, NewCategoryRow, NewGenreRow, NewTitleGenreRow, NewTitleRow, TitleRow,
};
use super::pool::DbPool;
use super::schema::{categories, genres, title_genres, titles};

/// Diesel-backed catalogue repository.
#[derive(Clone)]
pub struct DieselCatalogueRepository {
    pool: DbPool,
}

impl DieselCatalogueRepository {
    /// Create a repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(err: super::pool::PoolError) -> CataloguePersistenceError {
    CataloguePersistenceError::connection(err.to_string())
}

fn map_diesel_error(err: diesel::result::Error) -> CataloguePersistenceError {
    if let diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) = &err {
        return CataloguePersistenceError::DuplicateSlug;
    }
    CataloguePersistenceError::query(err.to_string())
}

// Required by the diesel-async transaction combinator for BEGIN/COMMIT
// failures; body errors are mapped explicitly at each call site.
impl From<diesel::result::Error> for CataloguePersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        map_diesel_error(err)
    }
}

fn category_from_row(row: CategoryRow) -> Result<Category, CataloguePersistenceError> {
    let slug = Slug::new(row.slug)
        .map_err(|err| CataloguePersistenceError::query(format!("stored slug invalid: {err}")))?;
    Category::new(row.name, slug)
        .map_err(|err| CataloguePersistenceError::query(format!("stored category invalid: {err}")))
}

fn genre_from_row(row: GenreRow) -> Result<Genre, CataloguePersistenceError> {
    let slug = Slug::new(row.slug)
        .map_err(|err| CataloguePersistenceError::query(format!("stored slug invalid: {err}")))?;
    Genre::new(row.name, slug)
        .map_err(|err| CataloguePersistenceError::query(format!("stored genre invalid: {err}")))
}

async fn load_category(
    conn: &mut AsyncPgConnection,
    slug: &Slug,
) -> Result<Category, CataloguePersistenceError> {
    let row = categories::table
        .find(slug.as_ref())
        .select(CategoryRow::as_select())
        .first::<CategoryRow>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| CataloguePersistenceError::missing_category(slug.as_ref()))?;
    category_from_row(row)
}

async fn load_genres(
    conn: &mut AsyncPgConnection,
    slugs: &[Slug],
) -> Result<Vec<Genre>, CataloguePersistenceError> {
    let mut resolved = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let row = genres::table
            .find(slug.as_ref())
            .select(GenreRow::as_select())
            .first::<GenreRow>(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| CataloguePersistenceError::missing_genre(slug.as_ref()))?;
        resolved.push(genre_from_row(row)?);
    }
    Ok(resolved)
}

/// Assemble domain titles from their rows plus the category and genre maps.
fn assemble_titles(
    rows: Vec<TitleRow>,
    categories_by_slug: &HashMap<String, Category>,
    genres_by_title: &HashMap<Uuid, Vec<Genre>>,
) -> Result<Vec<Title>, CataloguePersistenceError> {
    rows.into_iter()
        .map(|row| {
            let category = row
                .category_slug
                .as_ref()
                .and_then(|slug| categories_by_slug.get(slug))
                .cloned();
            Ok(Title {
                id: row.id,
                name: row.name,
                year: row.year,
                description: row.description,
                category,
                genre: genres_by_title.get(&row.id).cloned().unwrap_or_default(),
                rating: None,
            })
        })
        .collect()
}

async fn load_titles(
    conn: &mut AsyncPgConnection,
    rows: Vec<TitleRow>,
) -> Result<Vec<Title>, CataloguePersistenceError> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let category_rows = categories::table
        .select(CategoryRow::as_select())
        .load::<CategoryRow>(conn)
        .await
        .map_err(map_diesel_error)?;
    let mut categories_by_slug = HashMap::with_capacity(category_rows.len());
    for row in category_rows {
        let slug = row.slug.clone();
        categories_by_slug.insert(slug, category_from_row(row)?);
    }

    let link_rows: Vec<(Uuid, GenreRow)> = title_genres::table
        .inner_join(genres::table)
        .filter(title_genres::title_id.eq_any(&ids))
        .select((title_genres::title_id, GenreRow::as_select()))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let mut genres_by_title: HashMap<Uuid, Vec<Genre>> = HashMap::new();
    for (title_id, row) in link_rows {
        genres_by_title
            .entry(title_id)
            .or_default()
            .push(genre_from_row(row)?);
    }

    assemble_titles(rows, &categories_by_slug, &genres_by_title)
}

#[async_trait]
impl CatalogueRepository for DieselCatalogueRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = categories::table
            .order(categories::name.asc())
            .select(CategoryRow::as_select())
            .load::<CategoryRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(category_from_row).collect()
    }

    async fn insert_category(
        &self,
        category: &Category,
    ) -> Result<(), CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(categories::table)
            .values(NewCategoryRow {
                slug: category.slug.as_ref(),
                name: &category.name,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn delete_category(&self, slug: &Slug) -> Result<bool, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(categories::table.find(slug.as_ref()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = genres::table
            .order(genres::name.asc())
            .select(GenreRow::as_select())
            .load::<GenreRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(genre_from_row).collect()
    }

    async fn insert_genre(&self, genre: &Genre) -> Result<(), CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(genres::table)
            .values(NewGenreRow {
                slug: genre.slug.as_ref(),
                name: &genre.name,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn delete_genre(&self, slug: &Slug) -> Result<bool, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(genres::table.find(slug.as_ref()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list_titles(&self) -> Result<Vec<Title>, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = titles::table
            .order(titles::name.asc())
            .select(TitleRow::as_select())
            .load::<TitleRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        load_titles(&mut conn, rows).await
    }

    async fn find_title(&self, id: Uuid) -> Result<Option<Title>, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = titles::table
            .find(id)
            .select(TitleRow::as_select())
            .first::<TitleRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match row {
            Some(row) => Ok(load_titles(&mut conn, vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn insert_title(
        &self,
        draft: &TitleDraft,
    ) -> Result<Title, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = Uuid::new_v4();
        let title = conn
            .transaction::<Title, CataloguePersistenceError, _>(|conn| {
                async move {
                    let category = match &draft.category {
                        Some(slug) => Some(load_category(conn, slug).await?),
                        None => None,
                    };
                    let genre = load_genres(conn, &draft.genre).await?;

                    diesel::insert_into(titles::table)
                        .values(NewTitleRow {
                            id,
                            name: &draft.name,
                            year: draft.year,
                            description: draft.description.as_deref(),
                            category_slug: draft.category.as_ref().map(Slug::as_ref),
                        })
                        .execute(conn)
                        .await
                        .map_err(map_diesel_error)?;
                    for slug in &draft.genre {
                        diesel::insert_into(title_genres::table)
                            .values(NewTitleGenreRow {
                                title_id: id,
                                genre_slug: slug.as_ref(),
                            })
                            .execute(conn)
                            .await
                            .map_err(map_diesel_error)?;
                    }

                    Ok(Title {
                        id,
                        name: draft.name.clone(),
                        year: draft.year,
                        description: draft.description.clone(),
                        category,
                        genre,
                        rating: None,
                    })
                }
                .scope_boxed()
            })
            .await?;
        Ok(title)
    }

    async fn update_title(
        &self,
        id: Uuid,
        patch: &TitlePatch,
    ) -> Result<Option<Title>, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = conn
            .transaction::<Option<TitleRow>, CataloguePersistenceError, _>(|conn| {
                async move {
                    let Some(mut row) = titles::table
                        .find(id)
                        .select(TitleRow::as_select())
                        .first::<TitleRow>(conn)
                        .await
                        .optional()
                        .map_err(map_diesel_error)?
                    else {
                        return Ok(None);
                    };

                    if let Some(category) = &patch.category {
                        load_category(conn, category).await?;
                        row.category_slug = Some(category.as_ref().to_owned());
                    }
                    if let Some(name) = &patch.name {
                        row.name.clone_from(name);
                    }
                    if let Some(year) = patch.year {
                        row.year = year;
                    }
                    if let Some(description) = &patch.description {
                        row.description = Some(description.clone());
                    }

                    diesel::update(titles::table.find(id))
                        .set((
                            titles::name.eq(&row.name),
                            titles::year.eq(row.year),
                            titles::description.eq(row.description.as_deref()),
                            titles::category_slug.eq(row.category_slug.as_deref()),
                        ))
                        .execute(conn)
                        .await
                        .map_err(map_diesel_error)?;

                    if let Some(genre) = &patch.genre {
                        load_genres(conn, genre).await?;
                        diesel::delete(title_genres::table.filter(title_genres::title_id.eq(id)))
                            .execute(conn)
                            .await
                            .map_err(map_diesel_error)?;
                        for slug in genre {
                            diesel::insert_into(title_genres::table)
                                .values(NewTitleGenreRow {
                                    title_id: id,
                                    genre_slug: slug.as_ref(),
                                })
                                .execute(conn)
                                .await
                                .map_err(map_diesel_error)?;
                        }
                    }

                    Ok(Some(row))
                }
                .scope_boxed()
            })
            .await?;
        match updated {
            Some(row) => Ok(load_titles(&mut conn, vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn delete_title(&self, id: Uuid) -> Result<bool, CataloguePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(titles::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
