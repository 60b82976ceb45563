//! Equipment Lending Client
//!
//! Client core of the equipment lending system: a REST client for the lending
//! server, a local SQLite cache, the role/department permission matrix and a
//! background poller for borrow request notifications.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod permissions;
pub mod repository;
pub mod services;
pub mod session;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use crate::{api::ApiClient, repository::Repository, services::Services, session::SessionManager};

/// Application state shared by every front end
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub api: ApiClient,
    pub repository: Repository,
    pub services: Arc<Services>,
}

impl AppState {
    /// Open the cache and build the client and services from configuration
    pub async fn init(config: AppConfig) -> AppResult<Self> {
        let repository = Repository::connect(&config.cache).await?;
        let api = ApiClient::new(&config.api, SessionManager::new())?;
        let services = Services::new(api.clone(), repository.clone());

        Ok(Self {
            config: Arc::new(config),
            api,
            repository,
            services: Arc::new(services),
        })
    }
}
