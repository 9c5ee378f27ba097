//! Copy (physical item) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::copy::{Copy, CopyQuery, CreateCopy, UpdateCopy, UpdateCopyStatus},
};

use super::AuthenticatedUser;

/// List copies with optional filters
#[utoipa::path(
    get,
    path = "/copies",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("library_id" = Option<i32>, Query, description = "Filter by library"),
        ("title_id" = Option<i32>, Query, description = "Filter by title"),
        ("inventory_id" = Option<i32>, Query, description = "Filter by inventory"),
        ("status" = Option<String>, Query, description = "Filter by status")
    ),
    responses(
        (status = 200, description = "List of copies", body = Vec<Copy>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_copies(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<CopyQuery>,
) -> AppResult<Json<Vec<Copy>>> {
    let copies = state.services.copies.list(&query).await?;
    Ok(Json(copies))
}

/// Get copy by ID
#[utoipa::path(
    get,
    path = "/copies/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy", body = Copy),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Copy>> {
    let copy = state.services.copies.get(id).await?;
    Ok(Json(copy))
}

/// Barcode lookup query
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BarcodeQuery {
    pub library_id: Option<i32>,
}

/// Look up copies by barcode. Barcodes are unique per branch, so an
/// unscoped lookup may match one copy per branch.
#[utoipa::path(
    get,
    path = "/copies/barcode/{barcode}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("barcode" = String, Path, description = "Copy barcode"),
        ("library_id" = Option<i32>, Query, description = "Restrict to one branch")
    ),
    responses(
        (status = 200, description = "Matching copies", body = Vec<Copy>),
        (status = 404, description = "No copy with this barcode")
    )
)]
pub async fn find_by_barcode(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(barcode): Path<String>,
    Query(query): Query<BarcodeQuery>,
) -> AppResult<Json<Vec<Copy>>> {
    let copies = state
        .services
        .copies
        .find_by_barcode(&barcode, query.library_id)
        .await?;

    if copies.is_empty() {
        return Err(crate::error::AppError::NotFound(format!(
            "No copy with barcode '{}' found",
            barcode
        )));
    }

    Ok(Json(copies))
}

/// Register a new physical copy
#[utoipa::path(
    post,
    path = "/copies",
    tag = "copies",
    security(("bearer_auth" = [])),
    request_body = CreateCopy,
    responses(
        (status = 201, description = "Copy created", body = Copy),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Inventory, library or title not found"),
        (status = 409, description = "Barcode already in use")
    )
)]
pub async fn create_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(copy): Json<CreateCopy>,
) -> AppResult<(StatusCode, Json<Copy>)> {
    copy.validate()?;

    // Resolve the branch for the scope check before touching anything
    let library_id = match (copy.inventory_id, copy.library_id) {
        (Some(inventory_id), _) => state.services.inventory.get(inventory_id).await?.library_id,
        (None, Some(library_id)) => library_id,
        (None, None) => {
            return Err(crate::error::AppError::Validation(
                "Either inventory_id or both library_id and title_id are required".to_string(),
            ));
        }
    };
    claims.require_library_scope(library_id)?;

    let created = state.services.copies.create(&copy).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update copy metadata
#[utoipa::path(
    put,
    path = "/copies/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Copy ID")
    ),
    request_body = UpdateCopy,
    responses(
        (status = 200, description = "Copy updated", body = Copy),
        (status = 404, description = "Copy not found"),
        (status = 409, description = "Barcode already in use")
    )
)]
pub async fn update_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(copy): Json<UpdateCopy>,
) -> AppResult<Json<Copy>> {
    let current = state.services.copies.get(id).await?;
    claims.require_library_scope(current.library_id)?;
    copy.validate()?;

    let updated = state.services.copies.update(id, &copy).await?;
    Ok(Json(updated))
}

/// Override a copy's status (maintenance, reserved, restore from lost).
/// Borrow/return transitions go through the circulation workflows instead.
#[utoipa::path(
    put,
    path = "/copies/{id}/status",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Copy ID")
    ),
    request_body = UpdateCopyStatus,
    responses(
        (status = 200, description = "Copy updated", body = Copy),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_copy_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(body): Json<UpdateCopyStatus>,
) -> AppResult<Json<Copy>> {
    let current = state.services.copies.get(id).await?;
    claims.require_library_scope(current.library_id)?;

    let updated = state.services.copies.update_status(id, body.status).await?;
    Ok(Json(updated))
}

/// Withdraw a copy from the collection (refused while borrowed)
#[utoipa::path(
    delete,
    path = "/copies/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Copy ID")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found"),
        (status = 409, description = "Copy is currently borrowed")
    )
)]
pub async fn delete_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    let current = state.services.copies.get(id).await?;
    claims.require_library_scope(current.library_id)?;

    state.services.copies.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
