//! Borrow record (loan) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Fixed loan period applied at approval time
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Loan status. `overdue` is a derived correction of `borrowed` whose due
/// date has passed; `returned` and `lost` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Borrowed,
    Returned,
    Overdue,
    Lost,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Borrowed => "borrowed",
            LoanStatus::Returned => "returned",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Lost => "lost",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "borrowed" => Some(LoanStatus::Borrowed),
            "returned" => Some(LoanStatus::Returned),
            "overdue" => Some(LoanStatus::Overdue),
            "lost" => Some(LoanStatus::Lost),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Returned | LoanStatus::Lost)
    }

    /// Copy is still out of the building
    pub fn is_active(&self) -> bool {
        matches!(self, LoanStatus::Borrowed | LoanStatus::Overdue)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Loan record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i32,
    pub request_id: Option<i32>,
    pub user_id: i32,
    pub library_id: i32,
    pub title_id: i32,
    pub inventory_id: i32,
    pub copy_id: i32,
    pub status: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub approved_by: Option<i32>,
    pub late_fee: Decimal,
    pub damage_fee: Decimal,
    pub currency: String,
}

impl BorrowRecord {
    pub fn status(&self) -> Option<LoanStatus> {
        LoanStatus::parse(&self.status)
    }

    pub fn total_fees(&self) -> Decimal {
        self.late_fee + self.damage_fee
    }

    /// Derived overdue check, independent of the stored status
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        self.returned_at.is_none() && self.due_at < now
    }
}

/// Loan joined with title, copy barcode, branch and borrower for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RecordDetails {
    pub id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub library_id: i32,
    pub library_code: String,
    pub title_id: i32,
    pub title: String,
    pub copy_id: i32,
    pub barcode: Option<String>,
    pub status: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub late_fee: Decimal,
    pub damage_fee: Decimal,
    pub currency: String,
}

/// Fee adjustments supplied by staff at return or loss time. Both fees are
/// independent accumulators; a supplied value is added to the stored one.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FeeAdjustment {
    pub late_fee: Option<Decimal>,
    pub damage_fee: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl FeeAdjustment {
    /// Rejects negative adjustments before any state is touched
    pub fn validate_non_negative(&self) -> Result<(), String> {
        if self.late_fee.map_or(false, |f| f.is_sign_negative()) {
            return Err("late_fee must not be negative".to_string());
        }
        if self.damage_fee.map_or(false, |f| f.is_sign_negative()) {
            return Err("damage_fee must not be negative".to_string());
        }
        Ok(())
    }
}

/// Query parameters for loan listings
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct RecordQuery {
    pub user_id: Option<i32>,
    pub library_id: Option<i32>,
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn active_and_terminal_states() {
        assert!(LoanStatus::Borrowed.is_active());
        assert!(LoanStatus::Overdue.is_active());
        assert!(!LoanStatus::Returned.is_active());
        assert!(LoanStatus::Returned.is_terminal());
        assert!(LoanStatus::Lost.is_terminal());
        assert!(!LoanStatus::Overdue.is_terminal());
    }

    fn record(due_offset_days: i64, returned: bool) -> BorrowRecord {
        let now = Utc::now();
        BorrowRecord {
            id: 1,
            request_id: Some(1),
            user_id: 1,
            library_id: 1,
            title_id: 1,
            inventory_id: 1,
            copy_id: 1,
            status: "borrowed".to_string(),
            borrowed_at: now - Duration::days(LOAN_PERIOD_DAYS),
            due_at: now + Duration::days(due_offset_days),
            returned_at: returned.then_some(now),
            approved_by: Some(2),
            late_fee: dec("0"),
            damage_fee: dec("0"),
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn past_due_only_while_unreturned() {
        let now = Utc::now();
        assert!(record(-1, false).is_past_due(now));
        assert!(!record(1, false).is_past_due(now));
        assert!(!record(-1, true).is_past_due(now));
    }

    #[test]
    fn fees_accumulate_independently() {
        let mut r = record(1, false);
        r.late_fee = dec("2.5");
        r.damage_fee = dec("10.0");
        assert_eq!(r.total_fees(), dec("12.5"));
    }

    #[test]
    fn negative_fee_adjustments_rejected() {
        let adj = FeeAdjustment {
            late_fee: Some(dec("-1.0")),
            damage_fee: None,
            currency: None,
        };
        assert!(adj.validate_non_negative().is_err());

        let ok = FeeAdjustment {
            late_fee: Some(dec("1.0")),
            damage_fee: Some(dec("0")),
            currency: None,
        };
        assert!(ok.validate_non_negative().is_ok());
    }
}
