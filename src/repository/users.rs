//! Users cache

use sqlx::{Executor, Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Sqlite>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn list(&self, department_id: Option<&str>) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE (?1 IS NULL OR department_id = ?1) ORDER BY name",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub async fn upsert(&self, user: &User) -> AppResult<()> {
        insert(&self.pool, user).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn replace_all(&self, users: &[User]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
        for user in users {
            insert(&mut *tx, user).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

/// Passwords are never written to the cache
async fn insert<'e, E>(executor: E, user: &User) -> AppResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO users
            (id, name, contact, department_id, role, status, password, invitation_code)
        VALUES (?, ?, ?, ?, ?, ?, NULL, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.contact)
    .bind(&user.department_id)
    .bind(user.role)
    .bind(user.status)
    .bind(&user.invitation_code)
    .execute(executor)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{Role, UserStatus};
    use crate::repository::Repository;

    #[tokio::test]
    async fn test_roundtrip_drops_password() {
        let repo = Repository::in_memory().await.unwrap().users;
        let user = User {
            id: "u1".into(),
            name: "Alice".into(),
            contact: "alice@example.org".into(),
            department_id: "A".into(),
            role: Role::AdvancedUser,
            status: UserStatus::Pending,
            password: Some("secret".into()),
            invitation_code: Some("INV".into()),
        };
        repo.upsert(&user).await.unwrap();

        let stored = repo.get_by_id("u1").await.unwrap();
        assert_eq!(stored.role, Role::AdvancedUser);
        assert_eq!(stored.status, UserStatus::Pending);
        assert_eq!(stored.password, None);
        assert_eq!(repo.list(Some("B")).await.unwrap().len(), 0);
        assert_eq!(repo.list(Some("A")).await.unwrap().len(), 1);
    }
}
