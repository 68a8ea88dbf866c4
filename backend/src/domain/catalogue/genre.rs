//! Genre entity.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CatalogueValidationError, Slug, validate_entity_name};

/// Genre tag attachable to any number of titles.
///
/// ## Invariants
/// - `name` is non-empty and at most [`super::CATALOGUE_NAME_MAX`] characters.
/// - `slug` is unique across genres (storage enforced).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Genre {
    /// Display name.
    pub name: String,
    /// Unique URL identifier.
    #[schema(value_type = String, example = "sci-fi")]
    pub slug: Slug,
}

impl Genre {
    /// Validate and construct a [`Genre`].
    pub fn new(
        name: impl Into<String>,
        slug: Slug,
    ) -> Result<Self, CatalogueValidationError> {
        let name = name.into();
        validate_entity_name(&name)?;
        Ok(Self { name, slug })
    }
}
