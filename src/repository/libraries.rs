//! Libraries repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{map_unique_violation, AppError, AppResult},
    models::library::{CreateLibrary, Library, UpdateLibrary},
};

#[derive(Clone)]
pub struct LibrariesRepository {
    pool: Pool<Postgres>,
}

impl LibrariesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get library by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Library> {
        sqlx::query_as::<_, Library>("SELECT * FROM libraries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Library with id {} not found", id)))
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM libraries WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// List all branches ordered by code
    pub async fn list(&self) -> AppResult<Vec<Library>> {
        let libraries = sqlx::query_as::<_, Library>("SELECT * FROM libraries ORDER BY code")
            .fetch_all(&self.pool)
            .await?;
        Ok(libraries)
    }

    /// Create a new branch. The code must be unique.
    pub async fn create(&self, library: &CreateLibrary) -> AppResult<Library> {
        let now = Utc::now();

        sqlx::query_as::<_, Library>(
            r#"
            INSERT INTO libraries (code, name, address, contact_email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(&library.code)
        .bind(&library.name)
        .bind(&library.address)
        .bind(&library.contact_email)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, &format!("Library code '{}' already exists", library.code))
        })
    }

    /// Update branch attributes (the code is immutable)
    pub async fn update(&self, id: i32, library: &UpdateLibrary) -> AppResult<Library> {
        let now = Utc::now();

        sqlx::query_as::<_, Library>(
            r#"
            UPDATE libraries SET
                name = COALESCE($1, name),
                address = COALESCE($2, address),
                contact_email = COALESCE($3, contact_email),
                updated_at = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(library.name.as_deref())
        .bind(library.address.as_deref())
        .bind(library.contact_email.as_deref())
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Library with id {} not found", id)))
    }

    /// Delete a branch. Blocked while any inventory exists under it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let has_inventories: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM inventories WHERE library_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if has_inventories {
            return Err(AppError::Conflict(format!(
                "Library {} still has inventories; remove its holdings first",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM libraries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Library with id {} not found", id)));
        }

        Ok(())
    }
}
