//! REST client for the lending server
//!
//! Endpoint groups live in their own files as `impl ApiClient` blocks.

pub mod approvals;
pub mod auth;
pub mod borrow;
pub mod categories;
pub mod departments;
pub mod files;
pub mod interceptors;
pub mod items;
pub mod url;
pub mod users;
pub mod version;

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::{
    config::ApiConfig,
    error::{AppError, AppResult},
    session::SessionManager,
};

use self::url::{normalize_base_url, NormalizeOptions};

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<RwLock<Url>>,
    options: NormalizeOptions,
    session: SessionManager,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: SessionManager) -> AppResult<Self> {
        let options = NormalizeOptions {
            default_port: config.default_port,
            emulator_loopback: config.emulator_loopback,
        };
        let base_url = normalize_base_url(&config.server_address, options)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("lending-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("API client targeting {}", base_url);

        Ok(Self {
            http,
            base_url: Arc::new(RwLock::new(base_url)),
            options,
            session,
        })
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn base_url(&self) -> Url {
        self.base_url
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Point every subsequent request at a new server
    pub fn set_server_address(&self, address: &str) -> AppResult<Url> {
        let url = normalize_base_url(address, self.options)?;
        *self
            .base_url
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = url.clone();
        tracing::info!("API base URL changed to {}", url);
        Ok(url)
    }

    /// Append path segments to the base URL. Each segment is percent-encoded,
    /// so an id can never reach another route.
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        if let Some(segment) = segments.iter().find(|s| s.is_empty() || **s == "." || **s == "..") {
            return Err(AppError::Validation(format!("Invalid path segment {:?}", segment)));
        }

        let mut url = self.base_url();
        url.path_segments_mut()
            .map_err(|_| AppError::InvalidServerAddress("Base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Request carrying the session token
    async fn request(&self, method: Method, path: &[&str]) -> AppResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        let token = self.session.token().await;
        Ok(interceptors::with_bearer(self.http.request(method, url), token.as_deref()))
    }

    /// Request sent without credentials (login, signup)
    fn anonymous(&self, method: Method, path: &[&str]) -> AppResult<RequestBuilder> {
        Ok(self.http.request(method, self.endpoint(path)?))
    }

    async fn execute(&self, builder: RequestBuilder) -> AppResult<Response> {
        let request = builder.build().map_err(AppError::from_transport)?;
        let method = request.method().clone();
        let url = request.url().clone();

        let started = Instant::now();
        let result = self.http.execute(request).await;
        interceptors::log_exchange(&method, &url, result.as_ref().map(|r| r.status()), started.elapsed());

        let response = result.map_err(AppError::from_transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            self.session.expire().await;
        }
        Err(AppError::from_status(status, &body))
    }

    async fn execute_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AppResult<T> {
        self.execute(builder)
            .await?
            .json::<T>()
            .await
            .map_err(AppError::from_transport)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &[&str]) -> AppResult<T> {
        let builder = self.request(Method::GET, path).await?;
        self.execute_json(builder).await
    }

    pub(crate) async fn get_json_query<T, Q>(&self, path: &[&str], query: &Q) -> AppResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path).await?.query(query);
        self.execute_json(builder).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &[&str], body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).await?.json(body);
        self.execute_json(builder).await
    }

    pub(crate) async fn put_json<B, T>(&self, path: &[&str], body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PUT, path).await?.json(body);
        self.execute_json(builder).await
    }

    /// POST whose response body is ignored
    pub(crate) async fn post_empty<B: Serialize + ?Sized>(&self, path: &[&str], body: &B) -> AppResult<()> {
        let builder = self.request(Method::POST, path).await?.json(body);
        self.execute(builder).await.map(|_| ())
    }

    pub(crate) async fn delete(&self, path: &[&str]) -> AppResult<()> {
        let builder = self.request(Method::DELETE, path).await?;
        self.execute(builder).await.map(|_| ())
    }
}
