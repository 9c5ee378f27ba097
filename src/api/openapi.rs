//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{copies, events, health, inventories, libraries, records, requests, stats, titles, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circula API",
        version = "1.0.0",
        description = "Multi-Branch Library Circulation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Circula Contributors")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Libraries
        libraries::list_libraries,
        libraries::get_library,
        libraries::create_library,
        libraries::update_library,
        libraries::delete_library,
        // Titles
        titles::list_titles,
        titles::get_title,
        titles::create_title,
        titles::update_title,
        titles::delete_title,
        // Inventories
        inventories::list_inventories,
        inventories::get_inventory,
        inventories::create_inventory,
        inventories::adjust_inventory,
        inventories::delete_inventory,
        // Copies
        copies::list_copies,
        copies::get_copy,
        copies::find_by_barcode,
        copies::create_copy,
        copies::update_copy,
        copies::update_copy_status,
        copies::delete_copy,
        // Requests
        requests::create_request,
        requests::list_pending,
        requests::get_request,
        requests::decide_request,
        requests::cancel_request,
        requests::get_title_requests,
        requests::get_user_requests,
        // Records
        records::list_active,
        records::list_overdue,
        records::get_record,
        records::return_record,
        records::lose_record,
        records::sweep_overdue,
        records::get_user_records,
        // Users
        users::list_users,
        users::get_user,
        // Stats
        stats::get_stats,
        // Events
        events::stream_events,
    ),
    components(
        schemas(
            // Libraries
            crate::models::library::Library,
            crate::models::library::CreateLibrary,
            crate::models::library::UpdateLibrary,
            // Titles
            crate::models::title::Title,
            crate::models::title::CreateTitle,
            crate::models::title::UpdateTitle,
            crate::models::title::TitleQuery,
            titles::TitleListResponse,
            // Inventories
            crate::models::inventory::Inventory,
            crate::models::inventory::InventoryDetails,
            crate::models::inventory::CreateInventory,
            crate::models::inventory::AdjustInventory,
            crate::models::inventory::InventoryQuery,
            // Copies
            crate::models::copy::Copy,
            crate::models::copy::CopyStatus,
            crate::models::copy::CopyCondition,
            crate::models::copy::CreateCopy,
            crate::models::copy::UpdateCopy,
            crate::models::copy::UpdateCopyStatus,
            crate::models::copy::CopyQuery,
            // Requests
            crate::models::request::BorrowRequest,
            crate::models::request::RequestDetails,
            crate::models::request::RequestStatus,
            crate::models::request::CreateRequest,
            crate::models::request::DecideRequest,
            crate::models::request::Decision,
            requests::DecisionResponse,
            // Records
            crate::models::record::BorrowRecord,
            crate::models::record::RecordDetails,
            crate::models::record::LoanStatus,
            crate::models::record::FeeAdjustment,
            records::SweepResponse,
            // Users
            crate::models::user::User,
            crate::models::user::Role,
            // Events
            crate::models::event::CirculationEvent,
            crate::models::event::EventKind,
            // Stats
            stats::StatsResponse,
            stats::CopyStats,
            stats::CirculationStats,
            stats::StatEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "libraries", description = "Branch management"),
        (name = "titles", description = "Catalog title management"),
        (name = "inventories", description = "Per-branch holdings"),
        (name = "copies", description = "Physical copy management"),
        (name = "requests", description = "Borrow request workflow"),
        (name = "records", description = "Loan tracking"),
        (name = "users", description = "User directory"),
        (name = "stats", description = "Statistics"),
        (name = "events", description = "Real-time notifications")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
