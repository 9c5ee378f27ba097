//! Statistics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// One label/count pair in a breakdown
#[derive(Serialize, ToSchema)]
pub struct StatEntry {
    pub label: String,
    pub value: i64,
}

/// Holdings counts
#[derive(Serialize, ToSchema)]
pub struct CopyStats {
    pub total_titles: i64,
    pub total_copies: i64,
    pub by_status: Vec<StatEntry>,
}

/// Circulation counts
#[derive(Serialize, ToSchema)]
pub struct CirculationStats {
    pub pending_requests: i64,
    pub active_loans: i64,
    pub overdue_loans: i64,
    pub returned_today: i64,
}

/// Dashboard statistics
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub copies: CopyStats,
    pub circulation: CirculationStats,
}

/// Stats query
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StatsQuery {
    pub library_id: Option<i32>,
}

/// Get dashboard statistics, optionally scoped to one branch
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(
        ("library_id" = Option<i32>, Query, description = "Restrict to one branch")
    ),
    responses(
        (status = 200, description = "Statistics", body = StatsResponse),
        (status = 403, description = "Not staff, or branch outside scope")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<StatsResponse>> {
    match query.library_id {
        Some(library_id) => claims.require_library_scope(library_id)?,
        None => claims.require_admin()?,
    }

    let stats = state.services.stats.get_stats(query.library_id).await?;
    Ok(Json(stats))
}
