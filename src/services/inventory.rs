//! Inventory ledger service

use crate::{
    error::{AppError, AppResult},
    models::inventory::{AdjustInventory, CreateInventory, Inventory, InventoryDetails, InventoryQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self, id: i32) -> AppResult<Inventory> {
        self.repository.inventories.get_by_id(id).await
    }

    pub async fn list(&self, query: &InventoryQuery) -> AppResult<Vec<InventoryDetails>> {
        self.repository.inventories.list(query).await
    }

    pub async fn find_available(&self, library_id: Option<i32>) -> AppResult<Vec<InventoryDetails>> {
        self.repository.inventories.find_available(library_id).await
    }

    /// Explicit inventory creation for a pair the branch does not hold yet
    pub async fn create(&self, inventory: &CreateInventory) -> AppResult<Inventory> {
        if !self.repository.libraries.exists(inventory.library_id).await? {
            return Err(AppError::NotFound(format!(
                "Library with id {} not found",
                inventory.library_id
            )));
        }
        if !self.repository.titles.exists(inventory.title_id).await? {
            return Err(AppError::NotFound(format!(
                "Title with id {} not found",
                inventory.title_id
            )));
        }

        self.repository.inventories.create(inventory).await
    }

    pub async fn adjust(&self, id: i32, adjust: &AdjustInventory) -> AppResult<Inventory> {
        self.repository.inventories.adjust(id, adjust).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.inventories.delete(id).await
    }
}
