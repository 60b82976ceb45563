//! Category endpoints

use super::ApiClient;
use crate::{
    error::AppResult,
    models::category::{Category, CreateCategory, UpdateCategory},
};

impl ApiClient {
    pub async fn categories_list(&self) -> AppResult<Vec<Category>> {
        self.get_json(&["categories"]).await
    }

    pub async fn categories_create(&self, data: &CreateCategory) -> AppResult<Category> {
        self.post_json(&["categories"], data).await
    }

    pub async fn categories_update(&self, id: &str, data: &UpdateCategory) -> AppResult<Category> {
        self.put_json(&["categories", id], data).await
    }

    pub async fn categories_delete(&self, id: &str) -> AppResult<()> {
        self.delete(&["categories", id]).await
    }
}
