//! Backlot backend library modules.
//!
//! A content-review web API: catalogue of titles, categories, and genres;
//! per-title user reviews with comments; role-based access control; and
//! email-confirmation/JWT authentication.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
