//! Catalog service: branches, titles and directory lookups

use crate::{
    error::AppResult,
    models::library::{CreateLibrary, Library, UpdateLibrary},
    models::title::{CreateTitle, Title, TitleQuery, UpdateTitle},
    models::user::User,
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // --- Libraries ---

    pub async fn list_libraries(&self) -> AppResult<Vec<Library>> {
        self.repository.libraries.list().await
    }

    pub async fn get_library(&self, id: i32) -> AppResult<Library> {
        self.repository.libraries.get_by_id(id).await
    }

    pub async fn create_library(&self, library: &CreateLibrary) -> AppResult<Library> {
        self.repository.libraries.create(library).await
    }

    pub async fn update_library(&self, id: i32, library: &UpdateLibrary) -> AppResult<Library> {
        self.repository.libraries.update(id, library).await
    }

    pub async fn delete_library(&self, id: i32) -> AppResult<()> {
        self.repository.libraries.delete(id).await
    }

    // --- Titles ---

    pub async fn search_titles(&self, query: &TitleQuery) -> AppResult<(Vec<Title>, i64)> {
        self.repository.titles.search(query).await
    }

    pub async fn get_title(&self, id: i32) -> AppResult<Title> {
        self.repository.titles.get_by_id(id).await
    }

    pub async fn create_title(&self, title: &CreateTitle) -> AppResult<Title> {
        self.repository.titles.create(title).await
    }

    pub async fn update_title(&self, id: i32, title: &UpdateTitle) -> AppResult<Title> {
        self.repository.titles.update(id, title).await
    }

    pub async fn delete_title(&self, id: i32) -> AppResult<()> {
        self.repository.titles.delete(id).await
    }

    // --- Directory ---

    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }
}
