//! Borrow records repository for database operations
//!
//! Owns the loan state machine. Loans are only opened by the request
//! approval transaction; this repository handles everything after that.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::record::{BorrowRecord, FeeAdjustment, LoanStatus, RecordDetails},
    repository::inventories::recompute_counts,
};

const DETAILS_SELECT: &str = r#"
    SELECT r.id, r.user_id, u.name as user_name,
           r.library_id, l.code as library_code,
           r.title_id, t.title, r.copy_id, c.barcode, r.status,
           r.borrowed_at, r.due_at, r.returned_at,
           r.late_fee, r.damage_fee, r.currency
    FROM borrow_records r
    JOIN users u ON r.user_id = u.id
    JOIN libraries l ON r.library_id = l.id
    JOIN titles t ON r.title_id = t.id
    JOIN copies c ON r.copy_id = c.id
"#;

#[derive(Clone)]
pub struct RecordsRepository {
    pool: Pool<Postgres>,
}

impl RecordsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Flip past-due loans to `overdue` within a scope. Every read path
    /// applies this first so overdue is always derived, never scheduled.
    /// Idempotent and safe to run concurrently.
    async fn apply_overdue_correction(
        &self,
        user_id: Option<i32>,
        library_id: Option<i32>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE borrow_records SET status = 'overdue'
            WHERE status = 'borrowed' AND due_at < now()
              AND ($1::int4 IS NULL OR user_id = $1)
              AND ($2::int4 IS NULL OR library_id = $2)
            "#,
        )
        .bind(user_id)
        .bind(library_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get record by ID, with the overdue derivation applied
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowRecord> {
        sqlx::query(
            "UPDATE borrow_records SET status = 'overdue' \
             WHERE id = $1 AND status = 'borrowed' AND due_at < now()",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        sqlx::query_as::<_, BorrowRecord>("SELECT * FROM borrow_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", id)))
    }

    /// Close a loan as returned: set the return date, merge fee adjustments,
    /// put the copy back on the shelf and rewrite the counts, atomically.
    pub async fn mark_returned(
        &self,
        record_id: i32,
        fees: &FeeAdjustment,
    ) -> AppResult<BorrowRecord> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE id = $1 FOR UPDATE",
        )
        .bind(record_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Borrow record with id {} not found", record_id))
        })?;

        match record.status() {
            Some(LoanStatus::Returned) => {
                return Err(AppError::Conflict(format!(
                    "Borrow record {} is already returned",
                    record_id
                )));
            }
            Some(LoanStatus::Lost) => {
                return Err(AppError::Conflict(format!(
                    "Borrow record {} is recorded as lost",
                    record_id
                )));
            }
            _ => {}
        }

        let updated = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records
            SET status = 'returned', returned_at = $1,
                late_fee = late_fee + $2, damage_fee = damage_fee + $3,
                currency = COALESCE($4, currency)
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(fees.late_fee.unwrap_or(Decimal::ZERO))
        .bind(fees.damage_fee.unwrap_or(Decimal::ZERO))
        .bind(fees.currency.as_deref())
        .bind(record_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE copies SET status = 'available', updated_at = now() WHERE id = $1")
            .bind(record.copy_id)
            .execute(&mut *tx)
            .await?;

        recompute_counts(&mut tx, record.inventory_id).await?;
        tx.commit().await?;

        Ok(updated)
    }

    /// Close a loan as lost. The copy stays off the shelf until staff
    /// restore or replace it.
    pub async fn mark_lost(&self, record_id: i32, fees: &FeeAdjustment) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE id = $1 FOR UPDATE",
        )
        .bind(record_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Borrow record with id {} not found", record_id))
        })?;

        match record.status() {
            Some(LoanStatus::Returned) => {
                return Err(AppError::Conflict(format!(
                    "Borrow record {} is already returned",
                    record_id
                )));
            }
            Some(LoanStatus::Lost) => {
                return Err(AppError::Conflict(format!(
                    "Borrow record {} is already recorded as lost",
                    record_id
                )));
            }
            _ => {}
        }

        let updated = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records
            SET status = 'lost',
                late_fee = late_fee + $1, damage_fee = damage_fee + $2,
                currency = COALESCE($3, currency)
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(fees.late_fee.unwrap_or(Decimal::ZERO))
        .bind(fees.damage_fee.unwrap_or(Decimal::ZERO))
        .bind(fees.currency.as_deref())
        .bind(record_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE copies SET status = 'lost', updated_at = now() WHERE id = $1")
            .bind(record.copy_id)
            .execute(&mut *tx)
            .await?;

        recompute_counts(&mut tx, record.inventory_id).await?;
        tx.commit().await?;

        Ok(updated)
    }

    /// Loans still out (borrowed or overdue), soonest due first
    pub async fn find_active(
        &self,
        user_id: Option<i32>,
        library_id: Option<i32>,
    ) -> AppResult<Vec<RecordDetails>> {
        self.apply_overdue_correction(user_id, library_id).await?;

        let query = format!(
            r#"{DETAILS_SELECT}
            WHERE r.status IN ('borrowed', 'overdue')
              AND ($1::int4 IS NULL OR r.user_id = $1)
              AND ($2::int4 IS NULL OR r.library_id = $2)
            ORDER BY r.due_at
            "#
        );

        let records = sqlx::query_as::<_, RecordDetails>(&query)
            .bind(user_id)
            .bind(library_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Loans past their due date, most overdue first
    pub async fn find_overdue(&self, library_id: Option<i32>) -> AppResult<Vec<RecordDetails>> {
        self.apply_overdue_correction(None, library_id).await?;

        let query = format!(
            r#"{DETAILS_SELECT}
            WHERE r.status = 'overdue'
              AND ($1::int4 IS NULL OR r.library_id = $1)
            ORDER BY r.due_at
            "#
        );

        let records = sqlx::query_as::<_, RecordDetails>(&query)
            .bind(library_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// A user's full loan history, most recent first
    pub async fn find_by_user(&self, user_id: i32, limit: i64) -> AppResult<Vec<RecordDetails>> {
        self.apply_overdue_correction(Some(user_id), None).await?;

        let query = format!(
            r#"{DETAILS_SELECT}
            WHERE r.user_id = $1
            ORDER BY r.borrowed_at DESC
            LIMIT $2
            "#
        );

        let records = sqlx::query_as::<_, RecordDetails>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Global overdue sweep for the periodic notifier: flips past-due loans
    /// and returns the records that changed in this pass.
    pub async fn sweep_overdue(&self) -> AppResult<Vec<BorrowRecord>> {
        let flipped = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records SET status = 'overdue'
            WHERE status = 'borrowed' AND due_at < now()
            RETURNING *
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(flipped)
    }
}
