//! Pending registrations cache

use sqlx::{Executor, Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::registration::RegistrationRequest,
};

#[derive(Clone)]
pub struct RegistrationsRepository {
    pool: Pool<Sqlite>,
}

impl RegistrationsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn list(&self, department_id: Option<&str>) -> AppResult<Vec<RegistrationRequest>> {
        let rows = sqlx::query_as::<_, RegistrationRequest>(
            r#"
            SELECT * FROM registration_requests
            WHERE (?1 IS NULL OR department_id = ?1)
            ORDER BY requested_at
            "#,
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<RegistrationRequest> {
        sqlx::query_as::<_, RegistrationRequest>("SELECT * FROM registration_requests WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Registration {} not found", id)))
    }

    pub async fn upsert(&self, request: &RegistrationRequest) -> AppResult<()> {
        insert(&self.pool, request).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM registration_requests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn replace_all(&self, requests: &[RegistrationRequest]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM registration_requests").execute(&mut *tx).await?;
        for request in requests {
            insert(&mut *tx, request).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

async fn insert<'e, E>(executor: E, request: &RegistrationRequest) -> AppResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO registration_requests
            (id, name, contact, department_id, invitation_code, requested_at, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&request.id)
    .bind(&request.name)
    .bind(&request.contact)
    .bind(&request.department_id)
    .bind(&request.invitation_code)
    .bind(request.requested_at)
    .bind(request.status)
    .execute(executor)
    .await?;
    Ok(())
}
