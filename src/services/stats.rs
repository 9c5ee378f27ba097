//! Statistics service

use sqlx::Row;

use crate::{api::stats::{CirculationStats, CopyStats, StatEntry, StatsResponse}, error::AppResult, repository::Repository};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Headline counts for the dashboard, optionally scoped to a branch
    pub async fn get_stats(&self, library_id: Option<i32>) -> AppResult<StatsResponse> {
        let pool = &self.repository.pool;

        let total_titles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM titles")
            .fetch_one(pool)
            .await?;

        let total_copies: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM copies WHERE ($1::int4 IS NULL OR library_id = $1)",
        )
        .bind(library_id)
        .fetch_one(pool)
        .await?;

        let copies_by_status = sqlx::query(
            r#"
            SELECT status as label, COUNT(*) as value
            FROM copies
            WHERE ($1::int4 IS NULL OR library_id = $1)
            GROUP BY status
            ORDER BY value DESC
            "#,
        )
        .bind(library_id)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| StatEntry {
            label: row.get("label"),
            value: row.get("value"),
        })
        .collect();

        let pending_requests: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM borrow_requests
            WHERE status = 'pending' AND ($1::int4 IS NULL OR library_id = $1)
            "#,
        )
        .bind(library_id)
        .fetch_one(pool)
        .await?;

        let active_loans: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM borrow_records
            WHERE status IN ('borrowed', 'overdue')
              AND ($1::int4 IS NULL OR library_id = $1)
            "#,
        )
        .bind(library_id)
        .fetch_one(pool)
        .await?;

        // Counts past-due loans regardless of whether the lazy correction
        // has run yet
        let overdue_loans: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM borrow_records
            WHERE status IN ('borrowed', 'overdue') AND due_at < now()
              AND ($1::int4 IS NULL OR library_id = $1)
            "#,
        )
        .bind(library_id)
        .fetch_one(pool)
        .await?;

        let returned_today: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM borrow_records
            WHERE returned_at >= DATE_TRUNC('day', now())
              AND ($1::int4 IS NULL OR library_id = $1)
            "#,
        )
        .bind(library_id)
        .fetch_one(pool)
        .await?;

        Ok(StatsResponse {
            copies: CopyStats {
                total_titles,
                total_copies,
                by_status: copies_by_status,
            },
            circulation: CirculationStats {
                pending_requests,
                active_loans,
                overdue_loans,
                returned_today,
            },
        })
    }
}
