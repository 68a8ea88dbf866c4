//! Category entity.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CatalogueValidationError, Slug, validate_entity_name};

/// Grouping a title belongs to, such as films or books.
///
/// ## Invariants
/// - `name` is non-empty and at most [`super::CATALOGUE_NAME_MAX`] characters.
/// - `slug` is unique across categories (storage enforced).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    /// Display name.
    pub name: String,
    /// Unique URL identifier.
    #[schema(value_type = String, example = "films")]
    pub slug: Slug,
}

impl Category {
    /// Validate and construct a [`Category`].
    pub fn new(
        name: impl Into<String>,
        slug: Slug,
    ) -> Result<Self, CatalogueValidationError> {
        let name = name.into();
        validate_entity_name(&name)?;
        Ok(Self { name, slug })
    }
}
