//! Departments cache

use sqlx::{Executor, Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::department::Department,
};

#[derive(Clone)]
pub struct DepartmentsRepository {
    pool: Pool<Sqlite>,
}

impl DepartmentsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Department>> {
        let rows = sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Department> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Department {} not found", id)))
    }

    pub async fn children(&self, parent_id: &str) -> AppResult<Vec<Department>> {
        let rows = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE parent_id = ? ORDER BY name",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn upsert(&self, department: &Department) -> AppResult<()> {
        insert(&self.pool, department).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM departments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Overwrite the table with the server's list
    pub async fn replace_all(&self, departments: &[Department]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM departments").execute(&mut *tx).await?;
        for department in departments {
            insert(&mut *tx, department).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

async fn insert<'e, E>(executor: E, department: &Department) -> AppResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT OR REPLACE INTO departments (id, name, parent_id) VALUES (?, ?, ?)")
        .bind(&department.id)
        .bind(&department.name)
        .bind(&department.parent_id)
        .execute(executor)
        .await?;
    Ok(())
}
