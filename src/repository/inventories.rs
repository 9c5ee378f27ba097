//! Inventories repository for database operations
//!
//! Owns the holdings aggregate and its consistency rule: counts are always
//! rewritten from the authoritative copy rows, never adjusted by deltas.

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{map_unique_violation, AppError, AppResult},
    models::inventory::{AdjustInventory, CreateInventory, Inventory, InventoryDetails, InventoryQuery},
};

/// Rewrite an inventory's counts from its copy rows. Must run inside the
/// same transaction as the copy mutation so committed state never shows a
/// count that disagrees with the copy set.
pub async fn recompute_counts(conn: &mut PgConnection, inventory_id: i32) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE inventories SET
            total_copies = (SELECT COUNT(*) FROM copies WHERE inventory_id = $1),
            available_copies = (
                SELECT COUNT(*) FROM copies
                WHERE inventory_id = $1 AND status = 'available'
            ),
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(inventory_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[derive(Clone)]
pub struct InventoriesRepository {
    pool: Pool<Postgres>,
}

impl InventoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get inventory by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Inventory> {
        sqlx::query_as::<_, Inventory>("SELECT * FROM inventories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Inventory with id {} not found", id)))
    }

    /// Get the inventory for a (library, title) pair
    pub async fn get_by_pair(&self, library_id: i32, title_id: i32) -> AppResult<Option<Inventory>> {
        let inventory = sqlx::query_as::<_, Inventory>(
            "SELECT * FROM inventories WHERE library_id = $1 AND title_id = $2",
        )
        .bind(library_id)
        .bind(title_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(inventory)
    }

    /// Get or lazily create the inventory for a (library, title) pair.
    /// Safe under concurrent creation: the loser of the insert race reads
    /// the winner's row.
    pub async fn get_or_create(&self, library_id: i32, title_id: i32) -> AppResult<Inventory> {
        if let Some(inventory) = self.get_by_pair(library_id, title_id).await? {
            return Ok(inventory);
        }

        let inserted = sqlx::query_as::<_, Inventory>(
            r#"
            INSERT INTO inventories (library_id, title_id)
            VALUES ($1, $2)
            ON CONFLICT (library_id, title_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(library_id)
        .bind(title_id)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(inventory) => Ok(inventory),
            None => self.get_by_pair(library_id, title_id).await?.ok_or_else(|| {
                AppError::Internal(format!(
                    "Inventory for library {} / title {} vanished during creation",
                    library_id, title_id
                ))
            }),
        }
    }

    /// Explicitly create an inventory (normally created lazily with the
    /// first copy)
    pub async fn create(&self, inventory: &CreateInventory) -> AppResult<Inventory> {
        sqlx::query_as::<_, Inventory>(
            "INSERT INTO inventories (library_id, title_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(inventory.library_id)
        .bind(inventory.title_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                &format!(
                    "Inventory for library {} / title {} already exists",
                    inventory.library_id, inventory.title_id
                ),
            )
        })
    }

    /// List inventories with title/branch details
    pub async fn list(&self, query: &InventoryQuery) -> AppResult<Vec<InventoryDetails>> {
        let inventories = sqlx::query_as::<_, InventoryDetails>(
            r#"
            SELECT i.id, i.library_id, l.code as library_code,
                   i.title_id, t.title, t.isbn,
                   i.total_copies, i.available_copies
            FROM inventories i
            JOIN libraries l ON i.library_id = l.id
            JOIN titles t ON i.title_id = t.id
            WHERE ($1::int4 IS NULL OR i.library_id = $1)
              AND ($2::int4 IS NULL OR i.title_id = $2)
              AND (NOT $3 OR i.available_copies > 0)
            ORDER BY l.code, t.title
            "#,
        )
        .bind(query.library_id)
        .bind(query.title_id)
        .bind(query.available.unwrap_or(false))
        .fetch_all(&self.pool)
        .await?;

        Ok(inventories)
    }

    /// Inventories with at least one available copy
    pub async fn find_available(&self, library_id: Option<i32>) -> AppResult<Vec<InventoryDetails>> {
        self.list(&InventoryQuery {
            library_id,
            title_id: None,
            available: Some(true),
        })
        .await
    }

    /// Manual count correction. `available_copies` is clamped so it can
    /// never exceed `total_copies`.
    pub async fn adjust(&self, id: i32, adjust: &AdjustInventory) -> AppResult<Inventory> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Inventory>(
            "SELECT * FROM inventories WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Inventory with id {} not found", id)))?;

        let total = adjust.total_copies.unwrap_or(current.total_copies).max(0);
        let available = adjust
            .available_copies
            .unwrap_or(current.available_copies)
            .clamp(0, total);

        let updated = sqlx::query_as::<_, Inventory>(
            r#"
            UPDATE inventories
            SET total_copies = $1, available_copies = $2, updated_at = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(total)
        .bind(available)
        .bind(now)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete an inventory. Blocked while copies remain under it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let has_copies: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM copies WHERE inventory_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if has_copies {
            return Err(AppError::Conflict(format!(
                "Inventory {} still has copies; delete them first",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM inventories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Inventory with id {} not found", id)));
        }

        Ok(())
    }
}
