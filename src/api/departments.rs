//! Department endpoints

use super::ApiClient;
use crate::{
    error::AppResult,
    models::department::{CreateDepartment, Department, UpdateDepartment},
};

impl ApiClient {
    pub async fn departments_list(&self) -> AppResult<Vec<Department>> {
        self.get_json(&["departments"]).await
    }

    pub async fn departments_create(&self, data: &CreateDepartment) -> AppResult<Department> {
        self.post_json(&["departments"], data).await
    }

    pub async fn departments_update(&self, id: &str, data: &UpdateDepartment) -> AppResult<Department> {
        self.put_json(&["departments", id], data).await
    }

    pub async fn departments_delete(&self, id: &str) -> AppResult<()> {
        self.delete(&["departments", id]).await
    }
}
