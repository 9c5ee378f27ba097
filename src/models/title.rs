//! Title (bibliographic record) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Bibliographic title from database. One row per work; physical items are
/// tracked separately as copies.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Title {
    pub id: i32,
    pub isbn: Option<String>,
    pub title: String,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create title request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTitle {
    /// ISBN-10 or ISBN-13, hyphens allowed. Unique when present.
    #[validate(length(min = 10, max = 17))]
    pub isbn: Option<String>,
    #[validate(length(min = 1, max = 512))]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    #[validate(range(min = 0, max = 3000))]
    pub publication_year: Option<i16>,
    pub description: Option<String>,
}

/// Update title request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTitle {
    #[validate(length(min = 10, max = 17))]
    pub isbn: Option<String>,
    #[validate(length(min = 1, max = 512))]
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub publisher: Option<String>,
    #[validate(range(min = 0, max = 3000))]
    pub publication_year: Option<i16>,
    pub description: Option<String>,
}

/// Search/pagination parameters for listing titles
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TitleQuery {
    /// Case-insensitive substring match on the title
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
