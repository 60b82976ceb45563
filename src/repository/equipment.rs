//! Equipment items cache

use sqlx::{Executor, Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::equipment::EquipmentItem,
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Sqlite>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// List items, optionally filtered by category and/or department
    pub async fn list(
        &self,
        category_id: Option<&str>,
        department_id: Option<&str>,
    ) -> AppResult<Vec<EquipmentItem>> {
        let rows = sqlx::query_as::<_, EquipmentItem>(
            r#"
            SELECT * FROM equipment_items
            WHERE (?1 IS NULL OR category_id = ?1)
              AND (?2 IS NULL OR department_id = ?2)
            ORDER BY name
            "#,
        )
        .bind(category_id)
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Case-insensitive name search
    pub async fn search(&self, term: &str) -> AppResult<Vec<EquipmentItem>> {
        let pattern = format!("%{}%", term.trim());
        let rows = sqlx::query_as::<_, EquipmentItem>(
            "SELECT * FROM equipment_items WHERE name LIKE ? ORDER BY name",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<EquipmentItem> {
        sqlx::query_as::<_, EquipmentItem>("SELECT * FROM equipment_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    pub async fn upsert(&self, item: &EquipmentItem) -> AppResult<()> {
        insert(&self.pool, item).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM equipment_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn replace_all(&self, items: &[EquipmentItem]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM equipment_items").execute(&mut *tx).await?;
        for item in items {
            insert(&mut *tx, item).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

async fn insert<'e, E>(executor: E, item: &EquipmentItem) -> AppResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO equipment_items
            (id, name, category_id, department_id, quantity, available_quantity, description, image_url)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(&item.name)
    .bind(&item.category_id)
    .bind(&item.department_id)
    .bind(item.quantity)
    .bind(item.available_quantity)
    .bind(&item.description)
    .bind(&item.image_url)
    .execute(executor)
    .await?;
    Ok(())
}
