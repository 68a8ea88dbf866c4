//! Shared slug validation predicates for catalogue entities.
//!
//! Slugs are trimmed, non-empty identifiers composed of ASCII letters,
//! digits, hyphens, and underscores, at most [`SLUG_MAX`] characters.

/// Maximum allowed length for a catalogue slug.
pub const SLUG_MAX: usize = 50;

/// Return `true` when `value` is a valid catalogue slug.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    is_trimmed_non_empty(value) && value.chars().count() <= SLUG_MAX && has_allowed_chars(value)
}

fn is_trimmed_non_empty(value: &str) -> bool {
    !value.is_empty() && value.trim() == value
}

fn has_allowed_chars(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("films")]
    #[case("sci-fi")]
    #[case("TalkShows_2024")]
    fn accepts_well_formed_slugs(#[case] value: &str) {
        assert!(is_valid_slug(value));
    }

    #[rstest]
    #[case("")]
    #[case(" films")]
    #[case("films ")]
    #[case("film noir")]
    #[case("кино")]
    fn rejects_malformed_slugs(#[case] value: &str) {
        assert!(!is_valid_slug(value));
    }

    #[test]
    fn rejects_overlong_slugs() {
        let value = "x".repeat(SLUG_MAX + 1);
        assert!(!is_valid_slug(&value));
    }
}
