//! Catalogue aggregates: categories, genres, and titles.
//!
//! Purpose: strongly typed catalogue entities shared by the HTTP and
//! persistence layers. Validation lives in the constructors so adapters can
//! only hold well-formed values.

mod category;
mod genre;
mod title;

pub use category::Category;
pub use genre::Genre;
pub use title::{Title, TitleDraft, TitlePatch, validate_year};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::slug::{SLUG_MAX, is_valid_slug};

/// Validation errors returned by catalogue constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueValidationError {
    EmptyName,
    NameTooLong { max: usize },
    InvalidSlug,
    DescriptionTooLong { max: usize },
    YearInFuture { current: i32 },
}

impl fmt::Display for CatalogueValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::InvalidSlug => write!(
                f,
                "slug must contain only letters, digits, hyphens, or underscores \
                 (max {SLUG_MAX} characters)",
            ),
            Self::DescriptionTooLong { max } => {
                write!(f, "description must be at most {max} characters")
            }
            Self::YearInFuture { current } => {
                write!(f, "release year must not be later than {current}")
            }
        }
    }
}

impl std::error::Error for CatalogueValidationError {}

/// Maximum allowed length for catalogue entity names.
pub const CATALOGUE_NAME_MAX: usize = 256;

/// URL-safe identifier for categories and genres.
///
/// ## Invariants
/// - Matches the slug character class and length bound in [`crate::domain::slug`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate and construct a [`Slug`].
    pub fn new(value: impl Into<String>) -> Result<Self, CatalogueValidationError> {
        let value = value.into();
        if !is_valid_slug(&value) {
            return Err(CatalogueValidationError::InvalidSlug);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = CatalogueValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

pub(crate) fn validate_entity_name(value: &str) -> Result<(), CatalogueValidationError> {
    if value.trim().is_empty() {
        return Err(CatalogueValidationError::EmptyName);
    }
    if value.chars().count() > CATALOGUE_NAME_MAX {
        return Err(CatalogueValidationError::NameTooLong {
            max: CATALOGUE_NAME_MAX,
        });
    }
    Ok(())
}
