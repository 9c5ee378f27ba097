//! Borrow request workflow endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::record::BorrowRecord,
    models::request::{BorrowRequest, CreateRequest, DecideRequest, RequestDetails},
};

use super::AuthenticatedUser;

/// Decision response: the closed request, plus the opened loan on approval
#[derive(Serialize, ToSchema)]
pub struct DecisionResponse {
    pub request: BorrowRequest,
    pub record: Option<BorrowRecord>,
}

/// Pending listing query
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PendingQuery {
    pub library_id: Option<i32>,
}

/// Submit a borrow request for a title at a branch. The requester is taken
/// from the bearer token.
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request created", body = BorrowRequest),
        (status = 404, description = "Library, title or inventory not found"),
        (status = 409, description = "No available copy, or a pending request already exists")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<BorrowRequest>)> {
    request.validate()?;

    let created = state.services.requests.create(claims.sub, &request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List pending requests, oldest first (staff work queue)
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("library_id" = Option<i32>, Query, description = "Restrict to one branch")
    ),
    responses(
        (status = 200, description = "Pending requests", body = Vec<RequestDetails>),
        (status = 403, description = "Not staff, or branch outside scope")
    )
)]
pub async fn list_pending(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PendingQuery>,
) -> AppResult<Json<Vec<RequestDetails>>> {
    match query.library_id {
        Some(library_id) => claims.require_library_scope(library_id)?,
        None => claims.require_admin()?,
    }

    let requests = state.services.requests.find_pending(query.library_id).await?;
    Ok(Json(requests))
}

/// Get request by ID (own requests, or staff)
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request", body = BorrowRequest),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowRequest>> {
    let request = state.services.requests.get(id).await?;
    claims.require_self_or_scope(request.user_id, Some(request.library_id))?;

    Ok(Json(request))
}

/// Decide a pending request. Approval allocates a copy and opens the loan
/// atomically; rejection only closes the request.
#[utoipa::path(
    post,
    path = "/requests/{id}/decide",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    request_body = DecideRequest,
    responses(
        (status = 200, description = "Request decided", body = DecisionResponse),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already decided, or no copy left")
    )
)]
pub async fn decide_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(decision): Json<DecideRequest>,
) -> AppResult<Json<DecisionResponse>> {
    decision.validate()?;

    let request = state.services.requests.get(id).await?;
    claims.require_library_scope(request.library_id)?;

    let (request, record) = state
        .services
        .requests
        .decide(id, claims.sub, &decision)
        .await?;

    Ok(Json(DecisionResponse { request, record }))
}

/// Cancel one's own pending request
#[utoipa::path(
    post,
    path = "/requests/{id}/cancel",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request cancelled", body = BorrowRequest),
        (status = 403, description = "Request belongs to another user"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already decided")
    )
)]
pub async fn cancel_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowRequest>> {
    let cancelled = state.services.requests.cancel(id, claims.sub).await?;
    Ok(Json(cancelled))
}

/// Requests for a title across branches, newest first (staff)
#[utoipa::path(
    get,
    path = "/titles/{id}/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Title ID")
    ),
    responses(
        (status = 200, description = "Requests for the title", body = Vec<RequestDetails>),
        (status = 403, description = "Staff role required")
    )
)]
pub async fn get_title_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(title_id): Path<i32>,
) -> AppResult<Json<Vec<RequestDetails>>> {
    claims.require_staff()?;

    let requests = state.services.requests.find_by_title(title_id).await?;
    Ok(Json(requests))
}

/// A user's requests, newest first (own history, or staff)
#[utoipa::path(
    get,
    path = "/users/{id}/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's requests", body = Vec<RequestDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<RequestDetails>>> {
    claims.require_self_or_scope(user_id, None)?;

    let requests = state.services.requests.find_by_user(user_id).await?;
    Ok(Json(requests))
}
