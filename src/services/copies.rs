//! Copy registry service

use crate::{
    error::{AppError, AppResult},
    models::copy::{Copy, CopyQuery, CopyStatus, CreateCopy, UpdateCopy},
    repository::Repository,
};

#[derive(Clone)]
pub struct CopiesService {
    repository: Repository,
}

impl CopiesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self, id: i32) -> AppResult<Copy> {
        self.repository.copies.get_by_id(id).await
    }

    pub async fn list(&self, query: &CopyQuery) -> AppResult<Vec<Copy>> {
        self.repository.copies.list(query).await
    }

    pub async fn find_available(
        &self,
        library_id: Option<i32>,
        title_id: Option<i32>,
    ) -> AppResult<Vec<Copy>> {
        self.repository.copies.find_available(library_id, title_id).await
    }

    pub async fn find_by_barcode(
        &self,
        barcode: &str,
        library_id: Option<i32>,
    ) -> AppResult<Vec<Copy>> {
        self.repository.copies.find_by_barcode(barcode, library_id).await
    }

    /// Register a new physical copy. The owning inventory may be addressed
    /// directly or as a (library, title) pair, created lazily in the latter
    /// case.
    pub async fn create(&self, copy: &CreateCopy) -> AppResult<Copy> {
        let inventory = match (copy.inventory_id, copy.library_id, copy.title_id) {
            (Some(id), _, _) => self.repository.inventories.get_by_id(id).await?,
            (None, Some(library_id), Some(title_id)) => {
                if !self.repository.libraries.exists(library_id).await? {
                    return Err(AppError::NotFound(format!(
                        "Library with id {} not found",
                        library_id
                    )));
                }
                if !self.repository.titles.exists(title_id).await? {
                    return Err(AppError::NotFound(format!(
                        "Title with id {} not found",
                        title_id
                    )));
                }
                self.repository
                    .inventories
                    .get_or_create(library_id, title_id)
                    .await?
            }
            _ => {
                return Err(AppError::Validation(
                    "Either inventory_id or both library_id and title_id are required".to_string(),
                ));
            }
        };

        let library = self.repository.libraries.get_by_id(inventory.library_id).await?;

        self.repository.copies.create(&inventory, &library.code, copy).await
    }

    pub async fn update(&self, id: i32, copy: &UpdateCopy) -> AppResult<Copy> {
        self.repository.copies.update(id, copy).await
    }

    /// Staff status override (maintenance, reserved, restore from lost).
    /// Circulation transitions go through the request/record workflows.
    pub async fn update_status(&self, id: i32, status: CopyStatus) -> AppResult<Copy> {
        self.repository.copies.update_status(id, status).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.copies.delete(id).await
    }
}
