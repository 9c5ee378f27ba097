//! Copies repository for database operations

use chrono::{Datelike, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{map_unique_violation, AppError, AppResult},
    models::copy::{Copy, CopyQuery, CopyStatus, CreateCopy, UpdateCopy},
    models::inventory::Inventory,
    repository::inventories::recompute_counts,
};

#[derive(Clone)]
pub struct CopiesRepository {
    pool: Pool<Postgres>,
}

impl CopiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get copy by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Copy> {
        sqlx::query_as::<_, Copy>("SELECT * FROM copies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", id)))
    }

    /// List copies with optional filters
    pub async fn list(&self, query: &CopyQuery) -> AppResult<Vec<Copy>> {
        let copies = sqlx::query_as::<_, Copy>(
            r#"
            SELECT * FROM copies
            WHERE ($1::int4 IS NULL OR library_id = $1)
              AND ($2::int4 IS NULL OR title_id = $2)
              AND ($3::int4 IS NULL OR inventory_id = $3)
              AND ($4::text IS NULL OR status = $4)
            ORDER BY id
            "#,
        )
        .bind(query.library_id)
        .bind(query.title_id)
        .bind(query.inventory_id)
        .bind(query.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(copies)
    }

    /// Copies currently on the shelf
    pub async fn find_available(
        &self,
        library_id: Option<i32>,
        title_id: Option<i32>,
    ) -> AppResult<Vec<Copy>> {
        self.list(&CopyQuery {
            library_id,
            title_id,
            inventory_id: None,
            status: Some(CopyStatus::Available),
        })
        .await
    }

    /// Look up copies by barcode, optionally scoped to a branch. Barcodes
    /// are only unique per branch, so an unscoped lookup may return several.
    pub async fn find_by_barcode(
        &self,
        barcode: &str,
        library_id: Option<i32>,
    ) -> AppResult<Vec<Copy>> {
        let copies = sqlx::query_as::<_, Copy>(
            r#"
            SELECT * FROM copies
            WHERE barcode = $1 AND ($2::int4 IS NULL OR library_id = $2)
            ORDER BY library_id
            "#,
        )
        .bind(barcode)
        .bind(library_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(copies)
    }

    /// Create a copy under the given inventory, generating a barcode when
    /// none is supplied. A generated barcode that loses a creation race is
    /// recomputed and retried; a caller-supplied one surfaces as a conflict.
    pub async fn create(
        &self,
        inventory: &Inventory,
        library_code: &str,
        copy: &CreateCopy,
    ) -> AppResult<Copy> {
        let condition = copy.condition.map(|c| c.as_str()).unwrap_or("good");

        let mut attempts = 0;
        loop {
            attempts += 1;

            let barcode = match &copy.barcode {
                Some(b) => b.clone(),
                None => self.next_barcode(inventory.library_id, library_code).await?,
            };

            let mut tx = self.pool.begin().await?;

            let inserted = sqlx::query_as::<_, Copy>(
                r#"
                INSERT INTO copies (
                    inventory_id, library_id, title_id, barcode, status,
                    condition, shelf_location, acquired_on
                ) VALUES ($1, $2, $3, $4, 'available', $5, $6, $7)
                RETURNING *
                "#,
            )
            .bind(inventory.id)
            .bind(inventory.library_id)
            .bind(inventory.title_id)
            .bind(&barcode)
            .bind(condition)
            .bind(&copy.shelf_location)
            .bind(copy.acquired_on)
            .fetch_one(&mut *tx)
            .await;

            match inserted {
                Ok(created) => {
                    recompute_counts(&mut tx, inventory.id).await?;
                    tx.commit().await?;
                    return Ok(created);
                }
                Err(sqlx::Error::Database(db))
                    if db.is_unique_violation() && copy.barcode.is_none() && attempts < 3 =>
                {
                    // Lost the sequence race; recount and try again
                    continue;
                }
                Err(e) => {
                    return Err(map_unique_violation(
                        e,
                        &format!(
                            "Barcode '{}' is already in use at library {}",
                            barcode, inventory.library_id
                        ),
                    ));
                }
            }
        }
    }

    /// Next `{code}-{year}-{seq:04}` barcode for a branch, derived from the
    /// count of copies already carrying this year's prefix
    async fn next_barcode(&self, library_id: i32, library_code: &str) -> AppResult<String> {
        let year = Utc::now().year();
        let prefix = format!("{}-{}-", library_code, year);

        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM copies WHERE library_id = $1 AND barcode LIKE $2 || '%'",
        )
        .bind(library_id)
        .bind(&prefix)
        .fetch_one(&self.pool)
        .await?;

        Ok(format!("{}{:04}", prefix, existing + 1))
    }

    /// Update copy metadata (status changes go through `update_status` or
    /// the circulation workflows)
    pub async fn update(&self, id: i32, copy: &UpdateCopy) -> AppResult<Copy> {
        let now = Utc::now();

        sqlx::query_as::<_, Copy>(
            r#"
            UPDATE copies SET
                barcode = COALESCE($1, barcode),
                condition = COALESCE($2, condition),
                shelf_location = COALESCE($3, shelf_location),
                acquired_on = COALESCE($4, acquired_on),
                updated_at = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(copy.barcode.as_deref())
        .bind(copy.condition.map(|c| c.as_str()))
        .bind(copy.shelf_location.as_deref())
        .bind(copy.acquired_on)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Barcode is already in use at this library"))?
        .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", id)))
    }

    /// Direct status mutation. Legality of the transition is the calling
    /// workflow's business; the aggregate counts are rewritten either way.
    pub async fn update_status(&self, id: i32, status: CopyStatus) -> AppResult<Copy> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Copy>("SELECT * FROM copies WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", id)))?;

        let updated = sqlx::query_as::<_, Copy>(
            "UPDATE copies SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(status.as_str())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        recompute_counts(&mut tx, current.inventory_id).await?;
        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a copy. Refused while the copy is out on loan.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Copy>("SELECT * FROM copies WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", id)))?;

        if current.status == CopyStatus::Borrowed.as_str() {
            return Err(AppError::Conflict(format!(
                "Copy {} is currently borrowed and cannot be deleted",
                id
            )));
        }

        sqlx::query("DELETE FROM copies WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        recompute_counts(&mut tx, current.inventory_id).await?;
        tx.commit().await?;

        Ok(())
    }
}
