//! Inventory (per-branch holdings) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::inventory::{AdjustInventory, CreateInventory, Inventory, InventoryDetails, InventoryQuery},
};

use super::AuthenticatedUser;

/// List inventories, optionally filtered to one branch or to those with
/// available copies
#[utoipa::path(
    get,
    path = "/inventories",
    tag = "inventories",
    security(("bearer_auth" = [])),
    params(
        ("library_id" = Option<i32>, Query, description = "Filter by library"),
        ("title_id" = Option<i32>, Query, description = "Filter by title"),
        ("available" = Option<bool>, Query, description = "Only inventories with available copies")
    ),
    responses(
        (status = 200, description = "List of inventories", body = Vec<InventoryDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_inventories(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<InventoryQuery>,
) -> AppResult<Json<Vec<InventoryDetails>>> {
    let inventories = state.services.inventory.list(&query).await?;
    Ok(Json(inventories))
}

/// Get inventory by ID
#[utoipa::path(
    get,
    path = "/inventories/{id}",
    tag = "inventories",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Inventory ID")
    ),
    responses(
        (status = 200, description = "Inventory", body = Inventory),
        (status = 404, description = "Inventory not found")
    )
)]
pub async fn get_inventory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Inventory>> {
    let inventory = state.services.inventory.get(id).await?;
    Ok(Json(inventory))
}

/// Explicitly create an inventory for a (library, title) pair
#[utoipa::path(
    post,
    path = "/inventories",
    tag = "inventories",
    security(("bearer_auth" = [])),
    request_body = CreateInventory,
    responses(
        (status = 201, description = "Inventory created", body = Inventory),
        (status = 404, description = "Library or title not found"),
        (status = 409, description = "Inventory already exists")
    )
)]
pub async fn create_inventory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(inventory): Json<CreateInventory>,
) -> AppResult<(StatusCode, Json<Inventory>)> {
    claims.require_library_scope(inventory.library_id)?;
    inventory.validate()?;

    let created = state.services.inventory.create(&inventory).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Manually correct inventory counts. `available_copies` is clamped to
/// `total_copies`.
#[utoipa::path(
    put,
    path = "/inventories/{id}",
    tag = "inventories",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Inventory ID")
    ),
    request_body = AdjustInventory,
    responses(
        (status = 200, description = "Inventory updated", body = Inventory),
        (status = 404, description = "Inventory not found")
    )
)]
pub async fn adjust_inventory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(adjust): Json<AdjustInventory>,
) -> AppResult<Json<Inventory>> {
    let inventory = state.services.inventory.get(id).await?;
    claims.require_library_scope(inventory.library_id)?;
    adjust.validate()?;

    let updated = state.services.inventory.adjust(id, &adjust).await?;
    Ok(Json(updated))
}

/// Delete an empty inventory
#[utoipa::path(
    delete,
    path = "/inventories/{id}",
    tag = "inventories",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Inventory ID")
    ),
    responses(
        (status = 204, description = "Inventory deleted"),
        (status = 404, description = "Inventory not found"),
        (status = 409, description = "Inventory still has copies")
    )
)]
pub async fn delete_inventory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    let inventory = state.services.inventory.get(id).await?;
    claims.require_library_scope(inventory.library_id)?;

    state.services.inventory.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
