//! Titles repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{map_unique_violation, AppError, AppResult},
    models::title::{CreateTitle, Title, TitleQuery, UpdateTitle},
};

#[derive(Clone)]
pub struct TitlesRepository {
    pool: Pool<Postgres>,
}

impl TitlesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get title by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Title> {
        sqlx::query_as::<_, Title>("SELECT * FROM titles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Title with id {} not found", id)))
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM titles WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Search titles with pagination
    pub async fn search(&self, query: &TitleQuery) -> AppResult<(Vec<Title>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let title_filter = query.title.as_ref().map(|t| format!("%{}%", t));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM titles
            WHERE ($1::text IS NULL OR title ILIKE $1)
              AND ($2::text IS NULL OR isbn = $2)
            "#,
        )
        .bind(title_filter.as_deref())
        .bind(query.isbn.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let titles = sqlx::query_as::<_, Title>(
            r#"
            SELECT * FROM titles
            WHERE ($1::text IS NULL OR title ILIKE $1)
              AND ($2::text IS NULL OR isbn = $2)
            ORDER BY title
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(title_filter.as_deref())
        .bind(query.isbn.as_deref())
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((titles, total))
    }

    /// Create a new title. ISBN must be unique when present.
    pub async fn create(&self, title: &CreateTitle) -> AppResult<Title> {
        let now = Utc::now();

        sqlx::query_as::<_, Title>(
            r#"
            INSERT INTO titles (
                isbn, title, authors, publisher, publication_year, description,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(&title.isbn)
        .bind(&title.title)
        .bind(&title.authors)
        .bind(&title.publisher)
        .bind(title.publication_year)
        .bind(&title.description)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                &format!("A title with ISBN {:?} already exists", title.isbn),
            )
        })
    }

    /// Update a title (corrections only; identity stays put)
    pub async fn update(&self, id: i32, title: &UpdateTitle) -> AppResult<Title> {
        let now = Utc::now();

        sqlx::query_as::<_, Title>(
            r#"
            UPDATE titles SET
                isbn = COALESCE($1, isbn),
                title = COALESCE($2, title),
                authors = COALESCE($3, authors),
                publisher = COALESCE($4, publisher),
                publication_year = COALESCE($5, publication_year),
                description = COALESCE($6, description),
                updated_at = $7
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(title.isbn.as_deref())
        .bind(title.title.as_deref())
        .bind(&title.authors)
        .bind(title.publisher.as_deref())
        .bind(title.publication_year)
        .bind(title.description.as_deref())
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Another title already uses that ISBN"))?
        .ok_or_else(|| AppError::NotFound(format!("Title with id {} not found", id)))
    }

    /// Delete a title. Blocked while any of its copies is on loan; otherwise
    /// cascades through inventories, copies, requests and records.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let on_loan: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrow_records
                WHERE title_id = $1 AND status IN ('borrowed', 'overdue')
            )
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if on_loan {
            return Err(AppError::Conflict(format!(
                "Title {} has copies on loan and cannot be deleted",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Title with id {} not found", id)));
        }

        Ok(())
    }
}
