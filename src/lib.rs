//! Circula Library Circulation Server
//!
//! A Rust implementation of a multi-branch library management backend,
//! providing a REST JSON API for catalogs, per-branch holdings and the
//! borrow-request / loan workflow.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use services::notifier::BroadcastNotifier;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub notifier: Arc<BroadcastNotifier>,
}
