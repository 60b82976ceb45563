//! Local cache layer
//!
//! A disposable SQLite mirror of server data. The server stays the source of
//! truth: each sync overwrites a table wholesale and the last sync wins.

pub mod borrow_history;
pub mod categories;
pub mod departments;
pub mod equipment;
pub mod notified;
pub mod registrations;
pub mod users;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::str::FromStr;

use crate::{config::CacheConfig, error::AppResult};

/// Main repository struct holding the cache connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Sqlite>,
    pub departments: departments::DepartmentsRepository,
    pub categories: categories::CategoriesRepository,
    pub equipment: equipment::EquipmentRepository,
    pub users: users::UsersRepository,
    pub registrations: registrations::RegistrationsRepository,
    pub history: borrow_history::BorrowHistoryRepository,
    pub notified: notified::NotifiedRepository,
}

impl Repository {
    /// Create a new repository with the given pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            departments: departments::DepartmentsRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            registrations: registrations::RegistrationsRepository::new(pool.clone()),
            history: borrow_history::BorrowHistoryRepository::new(pool.clone()),
            notified: notified::NotifiedRepository::new(pool.clone()),
            pool,
        }
    }

    /// Open the cache database and bring its schema up to date
    pub async fn connect(config: &CacheConfig) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await?;

        let repository = Self::new(pool);
        repository.migrate().await?;
        tracing::info!("Local cache ready at {}", config.url);
        Ok(repository)
    }

    /// In-memory cache, one connection so every query sees the same database
    pub async fn in_memory() -> AppResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let repository = Self::new(pool);
        repository.migrate().await?;
        Ok(repository)
    }

    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Wipe every cached server table (logout). The notified set is kept.
    pub async fn clear_all(&self) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        for table in [
            "departments",
            "categories",
            "equipment_items",
            "users",
            "registration_requests",
            "borrow_history",
        ] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        tracing::debug!("Local cache cleared");
        Ok(())
    }
}
