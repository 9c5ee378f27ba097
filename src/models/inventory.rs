//! Inventory (per-branch holdings aggregate) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Aggregate holdings of one title at one branch. `available_copies` always
/// mirrors the count of copies in status `available`; it is rewritten from
/// that count after every copy mutation, never adjusted incrementally.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Inventory {
    pub id: i32,
    pub library_id: i32,
    pub title_id: i32,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inventory joined with title and branch for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InventoryDetails {
    pub id: i32,
    pub library_id: i32,
    pub library_code: String,
    pub title_id: i32,
    pub title: String,
    pub isbn: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
}

/// Create inventory request (explicit creation; inventories are otherwise
/// created lazily with the first copy of a pair)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInventory {
    #[validate(range(min = 1))]
    pub library_id: i32,
    #[validate(range(min = 1))]
    pub title_id: i32,
}

/// Manual count correction. `available_copies` is clamped to `total_copies`
/// at write time.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdjustInventory {
    #[validate(range(min = 0))]
    pub total_copies: Option<i32>,
    #[validate(range(min = 0))]
    pub available_copies: Option<i32>,
}

/// Filter parameters for listing inventories
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct InventoryQuery {
    pub library_id: Option<i32>,
    pub title_id: Option<i32>,
    /// Only inventories with at least one available copy
    pub available: Option<bool>,
}
