//! Business logic services

pub mod catalog;
pub mod copies;
pub mod inventory;
pub mod notifier;
pub mod records;
pub mod requests;
pub mod stats;

use std::sync::Arc;

use crate::{repository::Repository, services::notifier::NotificationSink};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub inventory: inventory::InventoryService,
    pub copies: copies::CopiesService,
    pub requests: requests::RequestsService,
    pub records: records::RecordsService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository and notification sink
    pub fn new(repository: Repository, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            inventory: inventory::InventoryService::new(repository.clone()),
            copies: copies::CopiesService::new(repository.clone()),
            requests: requests::RequestsService::new(repository.clone(), notifier.clone()),
            records: records::RecordsService::new(repository.clone(), notifier),
            stats: stats::StatsService::new(repository),
        }
    }
}
