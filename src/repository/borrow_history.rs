//! Borrow history cache

use sqlx::{Executor, Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::borrow::BorrowHistoryEntry,
};

#[derive(Clone)]
pub struct BorrowHistoryRepository {
    pool: Pool<Sqlite>,
}

impl BorrowHistoryRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<BorrowHistoryEntry> {
        sqlx::query_as::<_, BorrowHistoryEntry>("SELECT * FROM borrow_history WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow record {} not found", id)))
    }

    /// Every cached record, newest first
    pub async fn list(&self) -> AppResult<Vec<BorrowHistoryEntry>> {
        let rows = sqlx::query_as::<_, BorrowHistoryEntry>(
            "SELECT * FROM borrow_history ORDER BY borrow_date DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Newest first
    pub async fn list_for_borrower(&self, borrower_id: &str) -> AppResult<Vec<BorrowHistoryEntry>> {
        let rows = sqlx::query_as::<_, BorrowHistoryEntry>(
            "SELECT * FROM borrow_history WHERE borrower_id = ? ORDER BY borrow_date DESC",
        )
        .bind(borrower_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_for_department(&self, department_id: &str) -> AppResult<Vec<BorrowHistoryEntry>> {
        let rows = sqlx::query_as::<_, BorrowHistoryEntry>(
            "SELECT * FROM borrow_history WHERE department_id = ? ORDER BY borrow_date DESC",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn upsert(&self, entry: &BorrowHistoryEntry) -> AppResult<()> {
        insert(&self.pool, entry).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM borrow_history WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Replace the rows of one borrower, leaving other borrowers untouched
    pub async fn replace_for_borrower(&self, borrower_id: &str, entries: &[BorrowHistoryEntry]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM borrow_history WHERE borrower_id = ?")
            .bind(borrower_id)
            .execute(&mut *tx)
            .await?;
        for entry in entries {
            insert(&mut *tx, entry).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn replace_for_department(&self, department_id: &str, entries: &[BorrowHistoryEntry]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM borrow_history WHERE department_id = ?")
            .bind(department_id)
            .execute(&mut *tx)
            .await?;
        for entry in entries {
            insert(&mut *tx, entry).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn replace_all(&self, entries: &[BorrowHistoryEntry]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM borrow_history").execute(&mut *tx).await?;
        for entry in entries {
            insert(&mut *tx, entry).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

async fn insert<'e, E>(executor: E, entry: &BorrowHistoryEntry) -> AppResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO borrow_history
            (id, item_id, item_name, borrower_id, borrower_name, operator_id, operator_name,
             department_id, quantity, borrow_date, expected_return_date, actual_return_date,
             status, borrow_photo_url, return_photo_url, note)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.item_id)
    .bind(&entry.item_name)
    .bind(&entry.borrower_id)
    .bind(&entry.borrower_name)
    .bind(&entry.operator_id)
    .bind(&entry.operator_name)
    .bind(&entry.department_id)
    .bind(entry.quantity)
    .bind(entry.borrow_date)
    .bind(entry.expected_return_date)
    .bind(entry.actual_return_date)
    .bind(entry.status)
    .bind(&entry.borrow_photo_url)
    .bind(&entry.return_photo_url)
    .bind(&entry.note)
    .execute(executor)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::borrow::BorrowStatus;
    use crate::repository::Repository;
    use chrono::{Duration, TimeZone, Utc};

    fn entry(id: &str, borrower: &str, department: &str, day: u32) -> BorrowHistoryEntry {
        let borrowed = Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap();
        BorrowHistoryEntry {
            id: id.into(),
            item_id: "i1".into(),
            item_name: "Tripod".into(),
            borrower_id: borrower.into(),
            borrower_name: borrower.to_uppercase(),
            operator_id: None,
            operator_name: None,
            department_id: department.into(),
            quantity: 1,
            borrow_date: borrowed,
            expected_return_date: borrowed + Duration::days(7),
            actual_return_date: None,
            status: BorrowStatus::Borrowing,
            borrow_photo_url: Some("http://files/1.jpg".into()),
            return_photo_url: None,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_borrower_scoped_replace() {
        let repo = Repository::in_memory().await.unwrap().history;
        repo.replace_all(&[entry("1", "alice", "A", 1), entry("2", "bob", "A", 2)])
            .await
            .unwrap();

        repo.replace_for_borrower("alice", &[entry("3", "alice", "A", 5), entry("4", "alice", "B", 3)])
            .await
            .unwrap();

        let alice: Vec<_> = repo
            .list_for_borrower("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(alice, vec!["3", "4"]);
        assert_eq!(repo.list_for_borrower("bob").await.unwrap().len(), 1);
        assert_eq!(repo.list_for_department("A").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dates_and_status_survive_cache() {
        let repo = Repository::in_memory().await.unwrap().history;
        let mut returned = entry("9", "carol", "C", 10);
        returned.status = BorrowStatus::OverdueReturned;
        returned.actual_return_date = Some(returned.expected_return_date + Duration::days(1));
        repo.upsert(&returned).await.unwrap();

        assert_eq!(repo.get_by_id("9").await.unwrap(), returned);
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let repo = Repository::in_memory().await.unwrap().history;
        repo.replace_all(&[entry("1", "alice", "A", 1), entry("2", "bob", "B", 4)])
            .await
            .unwrap();

        let ids: Vec<_> = repo.list().await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["2", "1"]);

        repo.delete("2").await.unwrap();
        assert!(matches!(repo.get_by_id("2").await, Err(AppError::NotFound(_))));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
