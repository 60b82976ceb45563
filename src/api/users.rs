//! User management endpoints

use super::ApiClient;
use crate::{
    error::AppResult,
    models::user::{CreateUser, UpdateUser, User},
};

impl ApiClient {
    pub async fn users_list(&self) -> AppResult<Vec<User>> {
        self.get_json(&["users"]).await
    }

    pub async fn users_create(&self, data: &CreateUser) -> AppResult<User> {
        self.post_json(&["users"], data).await
    }

    pub async fn users_update(&self, id: &str, data: &UpdateUser) -> AppResult<User> {
        self.put_json(&["users", id], data).await
    }

    pub async fn users_delete(&self, id: &str) -> AppResult<()> {
        self.delete(&["users", id]).await
    }
}
