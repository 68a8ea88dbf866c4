//! Title entity and its write models.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Category, CatalogueValidationError, Genre, Slug, validate_entity_name};

/// Maximum allowed length for a title description.
pub const DESCRIPTION_MAX: usize = 256;

/// Reject release years later than the current calendar year.
///
/// The bound is dynamic: callers obtain `current_year` from the clock at the
/// moment of the request.
pub fn validate_year(year: i32, current_year: i32) -> Result<(), CatalogueValidationError> {
    if year > current_year {
        return Err(CatalogueValidationError::YearInFuture {
            current: current_year,
        });
    }
    Ok(())
}

/// Reviewable catalogue entry.
///
/// ## Invariants
/// - `year` was no later than the calendar year current when the title was
///   created or last updated.
/// - `rating` is the average review score, absent while unreviewed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Title {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Release year.
    pub year: i32,
    /// Optional blurb.
    pub description: Option<String>,
    /// Owning category, if assigned.
    pub category: Option<Category>,
    /// Attached genres.
    pub genre: Vec<Genre>,
    /// Average review score.
    pub rating: Option<f64>,
}

/// Validated payload for creating a title.
///
/// Category and genres are referenced by slug; the service resolves them and
/// rejects unknown references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleDraft {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category: Option<Slug>,
    pub genre: Vec<Slug>,
}

impl TitleDraft {
    /// Validate and construct a [`TitleDraft`].
    ///
    /// `current_year` bounds the release year; obtain it from the clock.
    pub fn new(
        name: impl Into<String>,
        year: i32,
        description: Option<String>,
        category: Option<Slug>,
        genre: Vec<Slug>,
        current_year: i32,
    ) -> Result<Self, CatalogueValidationError> {
        let name = name.into();
        validate_entity_name(&name)?;
        validate_year(year, current_year)?;
        if let Some(text) = description.as_deref() {
            validate_description(text)?;
        }
        Ok(Self {
            name,
            year,
            description,
            category,
            genre,
        })
    }
}

/// Partial update payload for a title.
///
/// Absent fields keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitlePatch {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<Slug>,
    pub genre: Option<Vec<Slug>>,
}

impl TitlePatch {
    /// Validate the provided fields against the same bounds as creation.
    pub fn validate(&self, current_year: i32) -> Result<(), CatalogueValidationError> {
        if let Some(name) = self.name.as_deref() {
            validate_entity_name(name)?;
        }
        if let Some(year) = self.year {
            validate_year(year, current_year)?;
        }
        if let Some(text) = self.description.as_deref() {
            validate_description(text)?;
        }
        Ok(())
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.year.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.genre.is_none()
    }
}

fn validate_description(text: &str) -> Result<(), CatalogueValidationError> {
    if text.chars().count() > DESCRIPTION_MAX {
        return Err(CatalogueValidationError::DescriptionTooLong {
            max: DESCRIPTION_MAX,
        });
    }
    Ok(())
}
