//! Circula Server - Multi-Branch Library Circulation System
//!
//! A Rust REST API server for branch inventories and the borrow workflow.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use circula_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{notifier::BroadcastNotifier, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("circula_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Circula Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository, notification sink and services
    let repository = Repository::new(pool);
    let notifier = Arc::new(BroadcastNotifier::new(256));
    let services = Services::new(repository, notifier.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        notifier,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Libraries (branches)
        .route("/libraries", get(api::libraries::list_libraries))
        .route("/libraries", post(api::libraries::create_library))
        .route("/libraries/:id", get(api::libraries::get_library))
        .route("/libraries/:id", put(api::libraries::update_library))
        .route("/libraries/:id", delete(api::libraries::delete_library))
        // Titles (catalog)
        .route("/titles", get(api::titles::list_titles))
        .route("/titles", post(api::titles::create_title))
        .route("/titles/:id", get(api::titles::get_title))
        .route("/titles/:id", put(api::titles::update_title))
        .route("/titles/:id", delete(api::titles::delete_title))
        .route("/titles/:id/requests", get(api::requests::get_title_requests))
        // Inventories
        .route("/inventories", get(api::inventories::list_inventories))
        .route("/inventories", post(api::inventories::create_inventory))
        .route("/inventories/:id", get(api::inventories::get_inventory))
        .route("/inventories/:id", put(api::inventories::adjust_inventory))
        .route("/inventories/:id", delete(api::inventories::delete_inventory))
        // Copies
        .route("/copies", get(api::copies::list_copies))
        .route("/copies", post(api::copies::create_copy))
        .route("/copies/barcode/:barcode", get(api::copies::find_by_barcode))
        .route("/copies/:id", get(api::copies::get_copy))
        .route("/copies/:id", put(api::copies::update_copy))
        .route("/copies/:id", delete(api::copies::delete_copy))
        .route("/copies/:id/status", put(api::copies::update_copy_status))
        // Borrow requests
        .route("/requests", get(api::requests::list_pending))
        .route("/requests", post(api::requests::create_request))
        .route("/requests/:id", get(api::requests::get_request))
        .route("/requests/:id/decide", post(api::requests::decide_request))
        .route("/requests/:id/cancel", post(api::requests::cancel_request))
        // Borrow records (loans)
        .route("/records", get(api::records::list_active))
        .route("/records/overdue", get(api::records::list_overdue))
        .route("/records/overdue/sweep", post(api::records::sweep_overdue))
        .route("/records/:id", get(api::records::get_record))
        .route("/records/:id/return", post(api::records::return_record))
        .route("/records/:id/lost", post(api::records::lose_record))
        // User directory and per-user listings
        .route("/users", get(api::users::list_users))
        .route("/users/:id", get(api::users::get_user))
        .route("/users/:id/requests", get(api::requests::get_user_requests))
        .route("/users/:id/records", get(api::records::get_user_records))
        // Statistics
        .route("/stats", get(api::stats::get_stats))
        // Real-time notifications
        .route("/events", get(api::events::stream_events))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
