//! Review and comment entities.
//!
//! The one-review-per-(title, author) invariant is owned by
//! [`crate::domain::review_service`] together with the storage-level unique
//! constraint; the types here only guarantee well-formed fields.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by review and comment constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewValidationError {
    EmptyText,
    ScoreOutOfRange,
}

impl fmt::Display for ReviewValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyText => write!(f, "text must not be empty"),
            Self::ScoreOutOfRange => {
                write!(f, "score must be between {SCORE_MIN} and {SCORE_MAX}")
            }
        }
    }
}

impl std::error::Error for ReviewValidationError {}

/// Lowest accepted review score.
pub const SCORE_MIN: i32 = 1;
/// Highest accepted review score.
pub const SCORE_MAX: i32 = 10;

/// Review score constrained to `[SCORE_MIN, SCORE_MAX]`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "i32", into = "i32")]
#[schema(value_type = i32)]
pub struct Score(i32);

impl Score {
    /// Validate and construct a [`Score`].
    pub fn new(value: i32) -> Result<Self, ReviewValidationError> {
        if !(SCORE_MIN..=SCORE_MAX).contains(&value) {
            return Err(ReviewValidationError::ScoreOutOfRange);
        }
        Ok(Self(value))
    }

    /// Numeric value.
    pub fn value(self) -> i32 {
        self.0
    }
}

impl From<Score> for i32 {
    fn from(value: Score) -> Self {
        value.0
    }
}

impl TryFrom<i32> for Score {
    type Error = ReviewValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Published review.
///
/// ## Invariants
/// - At most one review exists per (title, author) pair (storage enforced).
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    /// Stable identifier.
    pub id: Uuid,
    /// Reviewed title.
    pub title_id: Uuid,
    /// Authoring account.
    pub author_id: Uuid,
    /// Review body.
    pub text: String,
    /// Score in `[1, 10]`.
    pub score: Score,
    /// Publication timestamp.
    pub pub_date: DateTime<Utc>,
}

/// Validated payload for creating a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub text: String,
    pub score: Score,
}

impl ReviewDraft {
    /// Validate and construct a [`ReviewDraft`].
    pub fn new(text: impl Into<String>, score: i32) -> Result<Self, ReviewValidationError> {
        let text = text.into();
        validate_text(&text)?;
        Ok(Self {
            text,
            score: Score::new(score)?,
        })
    }
}

/// Partial update payload for a review.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    pub text: Option<String>,
    pub score: Option<Score>,
}

impl ReviewPatch {
    /// Validate the provided fields.
    pub fn validate(&self) -> Result<(), ReviewValidationError> {
        if let Some(text) = self.text.as_deref() {
            validate_text(text)?;
        }
        Ok(())
    }
}

/// Published comment under a review.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Stable identifier.
    pub id: Uuid,
    /// Parent review.
    pub review_id: Uuid,
    /// Authoring account.
    pub author_id: Uuid,
    /// Comment body.
    pub text: String,
    /// Publication timestamp.
    pub pub_date: DateTime<Utc>,
}

/// Validated payload for creating or updating a comment body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub text: String,
}

impl CommentDraft {
    /// Validate and construct a [`CommentDraft`].
    pub fn new(text: impl Into<String>) -> Result<Self, ReviewValidationError> {
        let text = text.into();
        validate_text(&text)?;
        Ok(Self { text })
    }
}

fn validate_text(text: &str) -> Result<(), ReviewValidationError> {
    if text.trim().is_empty() {
        return Err(ReviewValidationError::EmptyText);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(SCORE_MIN)]
    #[case(5)]
    #[case(SCORE_MAX)]
    fn score_accepts_the_inclusive_range(#[case] value: i32) {
        let score = Score::new(value).expect("score should validate");
        assert_eq!(score.value(), value);
    }

    #[rstest]
    #[case(SCORE_MIN - 1)]
    #[case(0)]
    #[case(SCORE_MAX + 1)]
    #[case(-3)]
    fn score_rejects_out_of_range_values(#[case] value: i32) {
        assert_eq!(Score::new(value), Err(ReviewValidationError::ScoreOutOfRange));
    }

    #[test]
    fn review_draft_requires_text_and_valid_score() {
        assert!(ReviewDraft::new("a fine film", 7).is_ok());
        assert_eq!(
            ReviewDraft::new("   ", 7),
            Err(ReviewValidationError::EmptyText)
        );
        assert_eq!(
            ReviewDraft::new("fine", 11),
            Err(ReviewValidationError::ScoreOutOfRange)
        );
    }

    #[test]
    fn review_patch_only_validates_present_fields() {
        assert!(ReviewPatch::default().validate().is_ok());
        let patch = ReviewPatch {
            text: Some(String::new()),
            score: None,
        };
        assert_eq!(patch.validate(), Err(ReviewValidationError::EmptyText));
    }

    #[test]
    fn comment_draft_requires_text() {
        assert!(CommentDraft::new("agreed").is_ok());
        assert_eq!(CommentDraft::new(""), Err(ReviewValidationError::EmptyText));
    }
}
