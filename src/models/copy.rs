//! Copy (physical item) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Physical copy status. Transition legality is enforced by the circulation
/// workflows, not by the copy itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CopyStatus {
    Available,
    Borrowed,
    Reserved,
    Lost,
    Maintenance,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Available => "available",
            CopyStatus::Borrowed => "borrowed",
            CopyStatus::Reserved => "reserved",
            CopyStatus::Lost => "lost",
            CopyStatus::Maintenance => "maintenance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(CopyStatus::Available),
            "borrowed" => Some(CopyStatus::Borrowed),
            "reserved" => Some(CopyStatus::Reserved),
            "lost" => Some(CopyStatus::Lost),
            "maintenance" => Some(CopyStatus::Maintenance),
            _ => None,
        }
    }
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Physical condition of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CopyCondition {
    New,
    Good,
    Used,
    Worn,
    Damaged,
}

impl CopyCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyCondition::New => "new",
            CopyCondition::Good => "good",
            CopyCondition::Used => "used",
            CopyCondition::Worn => "worn",
            CopyCondition::Damaged => "damaged",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(CopyCondition::New),
            "good" => Some(CopyCondition::Good),
            "used" => Some(CopyCondition::Used),
            "worn" => Some(CopyCondition::Worn),
            "damaged" => Some(CopyCondition::Damaged),
            _ => None,
        }
    }
}

impl std::fmt::Display for CopyCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Copy model from database. `library_id` and `title_id` are denormalized
/// from the owning inventory for query convenience.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Copy {
    pub id: i32,
    pub inventory_id: i32,
    pub library_id: i32,
    pub title_id: i32,
    /// Unique within the owning branch when present
    pub barcode: Option<String>,
    pub status: String,
    pub condition: String,
    pub shelf_location: Option<String>,
    pub acquired_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Copy {
    pub fn status(&self) -> Option<CopyStatus> {
        CopyStatus::parse(&self.status)
    }
}

/// Create copy request. The owning inventory may be given directly or as a
/// (library, title) pair; in the latter case the inventory is created lazily
/// when missing.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCopy {
    pub inventory_id: Option<i32>,
    pub library_id: Option<i32>,
    pub title_id: Option<i32>,
    /// Auto-generated as `{library_code}-{year}-{seq:04}` when absent
    #[validate(length(min = 1, max = 64))]
    pub barcode: Option<String>,
    pub condition: Option<CopyCondition>,
    pub shelf_location: Option<String>,
    pub acquired_on: Option<NaiveDate>,
}

/// Update copy request (metadata only; status changes go through
/// the status endpoint or the circulation workflows)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCopy {
    #[validate(length(min = 1, max = 64))]
    pub barcode: Option<String>,
    pub condition: Option<CopyCondition>,
    pub shelf_location: Option<String>,
    pub acquired_on: Option<NaiveDate>,
}

/// Direct status mutation request (staff action)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCopyStatus {
    pub status: CopyStatus,
}

/// Filter parameters for listing copies
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CopyQuery {
    pub library_id: Option<i32>,
    pub title_id: Option<i32>,
    pub inventory_id: Option<i32>,
    pub status: Option<CopyStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip() {
        for s in ["available", "borrowed", "reserved", "lost", "maintenance"] {
            assert_eq!(CopyStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(CopyStatus::parse("checked_out").is_none());
    }

    #[test]
    fn condition_roundtrip() {
        for s in ["new", "good", "used", "worn", "damaged"] {
            assert_eq!(CopyCondition::parse(s).unwrap().as_str(), s);
        }
    }
}
