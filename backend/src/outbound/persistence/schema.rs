//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; regenerate with
//! `diesel print-schema` after schema changes.

diesel::table! {
    /// Registered accounts.
    accounts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login name (max 150 characters).
        username -> Varchar,
        /// Unique contact address (max 254 characters).
        email -> Varchar,
        /// Role name: user, moderator, or admin.
        role -> Varchar,
        /// Operator flag outside the role system.
        is_superuser -> Bool,
        /// Optional profile field.
        first_name -> Nullable<Varchar>,
        /// Optional profile field.
        last_name -> Nullable<Varchar>,
        /// Optional free-text profile field.
        bio -> Nullable<Text>,
        /// Timestamp of the most recent confirmation-code issuance.
        code_issued_at -> Timestamptz,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Title categories, addressed by slug.
    categories (slug) {
        /// Primary key: URL-safe identifier (max 50 characters).
        slug -> Varchar,
        /// Display name (max 256 characters).
        name -> Varchar,
    }
}

diesel::table! {
    /// Title genres, addressed by slug.
    genres (slug) {
        /// Primary key: URL-safe identifier (max 50 characters).
        slug -> Varchar,
        /// Display name (max 256 characters).
        name -> Varchar,
    }
}

diesel::table! {
    /// Reviewable catalogue entries.
    titles (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name (max 256 characters).
        name -> Varchar,
        /// Release year, bounded by the current year at write time.
        year -> Int4,
        /// Optional blurb (max 256 characters).
        description -> Nullable<Varchar>,
        /// Owning category; cleared when the category is deleted.
        category_slug -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Many-to-many join between titles and genres.
    title_genres (title_id, genre_slug) {
        /// Referencing title.
        title_id -> Uuid,
        /// Referenced genre.
        genre_slug -> Varchar,
    }
}

diesel::table! {
    /// User reviews; unique per (title, author).
    reviews (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Reviewed title.
        title_id -> Uuid,
        /// Authoring account.
        author_id -> Uuid,
        /// Review body.
        text -> Text,
        /// Score in [1, 10], checked by the database.
        score -> Int4,
        /// Publication timestamp.
        pub_date -> Timestamptz,
    }
}

diesel::table! {
    /// Comments under reviews.
    comments (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Parent review.
        review_id -> Uuid,
        /// Authoring account.
        author_id -> Uuid,
        /// Comment body.
        text -> Text,
        /// Publication timestamp.
        pub_date -> Timestamptz,
    }
}

diesel::joinable!(titles -> categories (category_slug));
diesel::joinable!(title_genres -> titles (title_id));
diesel::joinable!(title_genres -> genres (genre_slug));
diesel::joinable!(reviews -> titles (title_id));
diesel::joinable!(reviews -> accounts (author_id));
diesel::joinable!(comments -> reviews (review_id));
diesel::joinable!(comments -> accounts (author_id));

diesel::allow_tables_to_appear_in_same_query!(
    accounts,
    categories,
    genres,
    titles,
    title_genres,
    reviews,
    comments,
);
