//! Title (catalog) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::title::{CreateTitle, Title, TitleQuery, UpdateTitle},
};

use super::AuthenticatedUser;

/// Paginated title listing
#[derive(Serialize, ToSchema)]
pub struct TitleListResponse {
    pub items: Vec<Title>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// List titles with search and pagination
#[utoipa::path(
    get,
    path = "/titles",
    tag = "titles",
    security(("bearer_auth" = [])),
    params(
        ("title" = Option<String>, Query, description = "Search in title"),
        ("isbn" = Option<String>, Query, description = "Exact ISBN match"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "List of titles", body = TitleListResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_titles(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<TitleQuery>,
) -> AppResult<Json<TitleListResponse>> {
    let (items, total) = state.services.catalog.search_titles(&query).await?;

    Ok(Json(TitleListResponse {
        items,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get title details by ID
#[utoipa::path(
    get,
    path = "/titles/{id}",
    tag = "titles",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Title ID")
    ),
    responses(
        (status = 200, description = "Title details", body = Title),
        (status = 404, description = "Title not found")
    )
)]
pub async fn get_title(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Title>> {
    let title = state.services.catalog.get_title(id).await?;
    Ok(Json(title))
}

/// Create a new title
#[utoipa::path(
    post,
    path = "/titles",
    tag = "titles",
    security(("bearer_auth" = [])),
    request_body = CreateTitle,
    responses(
        (status = 201, description = "Title created", body = Title),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn create_title(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(title): Json<CreateTitle>,
) -> AppResult<(StatusCode, Json<Title>)> {
    claims.require_staff()?;
    title.validate()?;

    let created = state.services.catalog.create_title(&title).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Correct title metadata
#[utoipa::path(
    put,
    path = "/titles/{id}",
    tag = "titles",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Title ID")
    ),
    request_body = UpdateTitle,
    responses(
        (status = 200, description = "Title updated", body = Title),
        (status = 404, description = "Title not found"),
        (status = 409, description = "ISBN already used by another title")
    )
)]
pub async fn update_title(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(title): Json<UpdateTitle>,
) -> AppResult<Json<Title>> {
    claims.require_staff()?;
    title.validate()?;

    let updated = state.services.catalog.update_title(id, &title).await?;
    Ok(Json(updated))
}

/// Delete a title (blocked while any of its copies is on loan)
#[utoipa::path(
    delete,
    path = "/titles/{id}",
    tag = "titles",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Title ID")
    ),
    responses(
        (status = 204, description = "Title deleted"),
        (status = 404, description = "Title not found"),
        (status = 409, description = "Title has copies on loan")
    )
)]
pub async fn delete_title(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.delete_title(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
