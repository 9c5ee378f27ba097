//! Repository layer for database operations

pub mod copies;
pub mod inventories;
pub mod libraries;
pub mod records;
pub mod requests;
pub mod titles;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub libraries: libraries::LibrariesRepository,
    pub titles: titles::TitlesRepository,
    pub users: users::UsersRepository,
    pub inventories: inventories::InventoriesRepository,
    pub copies: copies::CopiesRepository,
    pub requests: requests::RequestsRepository,
    pub records: records::RecordsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            libraries: libraries::LibrariesRepository::new(pool.clone()),
            titles: titles::TitlesRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            inventories: inventories::InventoriesRepository::new(pool.clone()),
            copies: copies::CopiesRepository::new(pool.clone()),
            requests: requests::RequestsRepository::new(pool.clone()),
            records: records::RecordsRepository::new(pool.clone()),
            pool,
        }
    }
}
