//! Persisted set of requests that already produced a notification, per user

use chrono::Utc;
use sqlx::{Pool, Sqlite};
use std::collections::HashSet;

use crate::{error::AppResult, models::borrow::BorrowStatus};

#[derive(Clone)]
pub struct NotifiedRepository {
    pool: Pool<Sqlite>,
}

impl NotifiedRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn contains(&self, user_id: &str, request_id: &str, status: BorrowStatus) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM notified_requests
                WHERE user_id = ? AND request_id = ? AND status = ?
            )
            "#,
        )
        .bind(user_id)
        .bind(request_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// All `(request_id, status)` keys of a user, for diffing a whole poll at once
    pub async fn keys(&self, user_id: &str) -> AppResult<HashSet<(String, BorrowStatus)>> {
        let rows: Vec<(String, BorrowStatus)> =
            sqlx::query_as("SELECT request_id, status FROM notified_requests WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    /// Returns false when the key was already present
    pub async fn mark(&self, user_id: &str, request_id: &str, status: BorrowStatus) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO notified_requests (user_id, request_id, status, notified_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(request_id)
        .bind(status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn clear(&self, user_id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM notified_requests WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
