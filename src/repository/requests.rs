//! Borrow requests repository for database operations
//!
//! Owns the request state machine and the approval transaction that turns a
//! pending request into an open loan.

use chrono::{Duration, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{map_unique_violation, AppError, AppResult},
    models::record::{BorrowRecord, LOAN_PERIOD_DAYS},
    models::request::{BorrowRequest, CreateRequest, RequestDetails, RequestStatus},
    repository::inventories::recompute_counts,
};

/// Claims one available copy of an inventory. SKIP LOCKED keeps concurrent
/// approvals from queueing on the same row, and the status guard on the
/// outer UPDATE makes the claim conditional at write time.
const CLAIM_COPY_SQL: &str = r#"
    UPDATE copies SET status = 'borrowed', updated_at = now()
    WHERE id = (
        SELECT id FROM copies
        WHERE inventory_id = $1 AND status = 'available'
        ORDER BY id
        LIMIT 1
        FOR UPDATE SKIP LOCKED
    )
    AND status = 'available'
    RETURNING id
"#;

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))
    }

    /// Create a pending request for a title at a branch. No copy is reserved
    /// yet; the request is only bound to the resolved inventory.
    pub async fn create(&self, user_id: i32, request: &CreateRequest) -> AppResult<BorrowRequest> {
        let library_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM libraries WHERE id = $1)")
                .bind(request.library_id)
                .fetch_one(&self.pool)
                .await?;
        if !library_exists {
            return Err(AppError::NotFound(format!(
                "Library with id {} not found",
                request.library_id
            )));
        }

        let title_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM titles WHERE id = $1)")
                .bind(request.title_id)
                .fetch_one(&self.pool)
                .await?;
        if !title_exists {
            return Err(AppError::NotFound(format!(
                "Title with id {} not found",
                request.title_id
            )));
        }

        let inventory: Option<(i32, i32)> = sqlx::query_as(
            "SELECT id, available_copies FROM inventories WHERE library_id = $1 AND title_id = $2",
        )
        .bind(request.library_id)
        .bind(request.title_id)
        .fetch_optional(&self.pool)
        .await?;

        let (inventory_id, available_copies) = inventory.ok_or_else(|| {
            AppError::NotFound(format!(
                "Title {} is not held at library {}",
                request.title_id, request.library_id
            ))
        })?;

        if available_copies <= 0 {
            return Err(AppError::InsufficientAvailability(format!(
                "No available copy of title {} at library {}",
                request.title_id, request.library_id
            )));
        }

        sqlx::query_as::<_, BorrowRequest>(
            r#"
            INSERT INTO borrow_requests (user_id, library_id, title_id, inventory_id, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(request.library_id)
        .bind(request.title_id)
        .bind(inventory_id)
        .bind(&request.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                "You already have a pending request for this title at this library",
            )
        })
    }

    /// Approve a pending request: claim a copy, open the loan, rewrite the
    /// counts and close the request, all in one transaction. Any failure
    /// rolls the whole sequence back.
    pub async fn approve(
        &self,
        request_id: i32,
        decider_id: i32,
        notes: Option<&str>,
    ) -> AppResult<(BorrowRequest, BorrowRecord)> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM borrow_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", request_id)))?;

        if request.status() != Some(RequestStatus::Pending) {
            return Err(AppError::Conflict(format!(
                "Request {} is already {}",
                request_id, request.status
            )));
        }

        // Availability may have been exhausted since the request was created
        let copy_id: Option<i32> = sqlx::query_scalar(CLAIM_COPY_SQL)
            .bind(request.inventory_id)
            .fetch_optional(&mut *tx)
            .await?;

        let copy_id = copy_id.ok_or_else(|| {
            AppError::InsufficientAvailability(format!(
                "No available copy left for title {} at library {}",
                request.title_id, request.library_id
            ))
        })?;

        let due_at = now + Duration::days(LOAN_PERIOD_DAYS);

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_records (
                request_id, user_id, library_id, title_id, inventory_id, copy_id,
                status, borrowed_at, due_at, approved_by
            ) VALUES ($1, $2, $3, $4, $5, $6, 'borrowed', $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.user_id)
        .bind(request.library_id)
        .bind(request.title_id)
        .bind(request.inventory_id)
        .bind(copy_id)
        .bind(now)
        .bind(due_at)
        .bind(decider_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, &format!("Copy {} already has an open loan", copy_id))
        })?;

        recompute_counts(&mut tx, request.inventory_id).await?;

        let approved = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = 'approved', copy_id = $1, decided_at = $2, decided_by = $3,
                notes = COALESCE($4, notes)
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(copy_id)
        .bind(now)
        .bind(decider_id)
        .bind(notes)
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((approved, record))
    }

    /// Reject a pending request. No side effects beyond the status change.
    pub async fn reject(
        &self,
        request_id: i32,
        decider_id: i32,
        notes: Option<&str>,
    ) -> AppResult<BorrowRequest> {
        let now = Utc::now();

        let updated = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = 'rejected', decided_at = $1, decided_by = $2,
                notes = COALESCE($3, notes)
            WHERE id = $4 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(decider_id)
        .bind(notes)
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(request) => Ok(request),
            None => {
                let request = self.get_by_id(request_id).await?;
                Err(AppError::Conflict(format!(
                    "Request {} is already {}",
                    request_id, request.status
                )))
            }
        }
    }

    /// Cancel a pending request. Only the requester may cancel.
    pub async fn cancel(&self, request_id: i32, caller_id: i32) -> AppResult<BorrowRequest> {
        let now = Utc::now();

        let request = self.get_by_id(request_id).await?;

        if request.user_id != caller_id {
            return Err(AppError::Forbidden(format!(
                "Request {} belongs to another user",
                request_id
            )));
        }

        let updated = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = 'cancelled', decided_at = $1
            WHERE id = $2 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| {
            AppError::Conflict(format!(
                "Request {} is already {}",
                request_id, request.status
            ))
        })
    }

    /// Pending requests, oldest first, optionally scoped to a branch
    pub async fn find_pending(&self, library_id: Option<i32>) -> AppResult<Vec<RequestDetails>> {
        self.find_details(Some(RequestStatus::Pending), library_id, None, None)
            .await
    }

    /// A user's requests, newest first
    pub async fn find_by_user(&self, user_id: i32) -> AppResult<Vec<RequestDetails>> {
        self.find_details(None, None, Some(user_id), None).await
    }

    /// Requests for a title across branches, newest first
    pub async fn find_by_title(&self, title_id: i32) -> AppResult<Vec<RequestDetails>> {
        self.find_details(None, None, None, Some(title_id)).await
    }

    async fn find_details(
        &self,
        status: Option<RequestStatus>,
        library_id: Option<i32>,
        user_id: Option<i32>,
        title_id: Option<i32>,
    ) -> AppResult<Vec<RequestDetails>> {
        // Pending listings read oldest-first (a work queue); history reads
        // newest-first.
        let order = match status {
            Some(RequestStatus::Pending) => "r.requested_at ASC",
            _ => "r.requested_at DESC",
        };

        let query = format!(
            r#"
            SELECT r.id, r.user_id, u.name as user_name,
                   r.library_id, l.code as library_code,
                   r.title_id, t.title, r.copy_id, r.status, r.notes,
                   r.requested_at, r.decided_at
            FROM borrow_requests r
            JOIN users u ON r.user_id = u.id
            JOIN libraries l ON r.library_id = l.id
            JOIN titles t ON r.title_id = t.id
            WHERE ($1::text IS NULL OR r.status = $1)
              AND ($2::int4 IS NULL OR r.library_id = $2)
              AND ($3::int4 IS NULL OR r.user_id = $3)
              AND ($4::int4 IS NULL OR r.title_id = $4)
            ORDER BY {}
            "#,
            order
        );

        let requests = sqlx::query_as::<_, RequestDetails>(&query)
            .bind(status.map(|s| s.as_str()))
            .bind(library_id)
            .bind(user_id)
            .bind(title_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }
}
