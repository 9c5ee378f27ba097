//! Borrow record (loan) endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::record::{BorrowRecord, FeeAdjustment, RecordDetails, RecordQuery},
};

use super::AuthenticatedUser;

/// Overdue listing query
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OverdueQuery {
    pub library_id: Option<i32>,
}

/// Sweep response
#[derive(Serialize, ToSchema)]
pub struct SweepResponse {
    /// Number of loans newly flipped to overdue
    pub flipped: usize,
}

/// List active loans (borrowed or overdue), soonest due first
#[utoipa::path(
    get,
    path = "/records",
    tag = "records",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = Option<i32>, Query, description = "Filter by borrower"),
        ("library_id" = Option<i32>, Query, description = "Filter by branch")
    ),
    responses(
        (status = 200, description = "Active loans", body = Vec<RecordDetails>),
        (status = 403, description = "Outside caller's scope")
    )
)]
pub async fn list_active(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RecordQuery>,
) -> AppResult<Json<Vec<RecordDetails>>> {
    // Members may read their own loans; staff read by branch scope
    match (query.user_id, query.library_id) {
        (Some(user_id), None) => claims.require_self_or_scope(user_id, None)?,
        (_, Some(library_id)) => claims.require_library_scope(library_id)?,
        (None, None) => claims.require_admin()?,
    }

    let records = state
        .services
        .records
        .find_active(query.user_id, query.library_id)
        .await?;
    Ok(Json(records))
}

/// List overdue loans, most overdue first
#[utoipa::path(
    get,
    path = "/records/overdue",
    tag = "records",
    security(("bearer_auth" = [])),
    params(
        ("library_id" = Option<i32>, Query, description = "Restrict to one branch")
    ),
    responses(
        (status = 200, description = "Overdue loans", body = Vec<RecordDetails>),
        (status = 403, description = "Not staff, or branch outside scope")
    )
)]
pub async fn list_overdue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<OverdueQuery>,
) -> AppResult<Json<Vec<RecordDetails>>> {
    match query.library_id {
        Some(library_id) => claims.require_library_scope(library_id)?,
        None => claims.require_admin()?,
    }

    let records = state.services.records.find_overdue(query.library_id).await?;
    Ok(Json(records))
}

/// Get loan by ID (own loans, or staff)
#[utoipa::path(
    get,
    path = "/records/{id}",
    tag = "records",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Record ID")
    ),
    responses(
        (status = 200, description = "Borrow record", body = BorrowRecord),
        (status = 404, description = "Record not found")
    )
)]
pub async fn get_record(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowRecord>> {
    let record = state.services.records.get(id).await?;
    claims.require_self_or_scope(record.user_id, Some(record.library_id))?;

    Ok(Json(record))
}

/// Check a copy back in, optionally applying fee adjustments
#[utoipa::path(
    post,
    path = "/records/{id}/return",
    tag = "records",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Record ID")
    ),
    request_body = FeeAdjustment,
    responses(
        (status = 200, description = "Loan closed", body = BorrowRecord),
        (status = 404, description = "Record not found"),
        (status = 409, description = "Loan already closed")
    )
)]
pub async fn return_record(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(fees): Json<FeeAdjustment>,
) -> AppResult<Json<BorrowRecord>> {
    let record = state.services.records.get(id).await?;
    claims.require_library_scope(record.library_id)?;

    let returned = state.services.records.mark_returned(id, &fees).await?;
    Ok(Json(returned))
}

/// Write a copy off as lost
#[utoipa::path(
    post,
    path = "/records/{id}/lost",
    tag = "records",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Record ID")
    ),
    request_body = FeeAdjustment,
    responses(
        (status = 200, description = "Loan closed as lost", body = BorrowRecord),
        (status = 404, description = "Record not found"),
        (status = 409, description = "Loan already closed")
    )
)]
pub async fn lose_record(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(fees): Json<FeeAdjustment>,
) -> AppResult<Json<BorrowRecord>> {
    let record = state.services.records.get(id).await?;
    claims.require_library_scope(record.library_id)?;

    let lost = state.services.records.mark_lost(id, &fees).await?;
    Ok(Json(lost))
}

/// Flip all past-due loans to overdue and emit notifications. Meant for an
/// external periodic sweep; read paths apply the same derivation lazily.
#[utoipa::path(
    post,
    path = "/records/overdue/sweep",
    tag = "records",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweep completed", body = SweepResponse),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn sweep_overdue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<SweepResponse>> {
    claims.require_admin()?;

    let flipped = state.services.records.sweep_overdue().await?;
    Ok(Json(SweepResponse { flipped }))
}

/// A user's loan history, most recent first (own history, or staff)
#[utoipa::path(
    get,
    path = "/users/{id}/records",
    tag = "records",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID"),
        ("limit" = Option<i64>, Query, description = "Max records (default: 50)")
    ),
    responses(
        (status = 200, description = "User's loan history", body = Vec<RecordDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_records(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
    Query(query): Query<RecordQuery>,
) -> AppResult<Json<Vec<RecordDetails>>> {
    claims.require_self_or_scope(user_id, None)?;
    query.validate()?;

    let limit = query.limit.unwrap_or(50);
    let records = state.services.records.find_by_user(user_id, limit).await?;
    Ok(Json(records))
}
