//! Equipment categories

use validator::Validate;

use crate::{
    api::ApiClient,
    error::AppResult,
    models::category::{Category, CreateCategory, UpdateCategory},
    permissions::{Permission, PermissionChecker},
    repository::Repository,
};

#[derive(Clone)]
pub struct CategoryService {
    api: ApiClient,
    repository: Repository,
}

impl CategoryService {
    pub fn new(api: ApiClient, repository: Repository) -> Self {
        Self { api, repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.list().await
    }

    pub async fn get(&self, id: &str) -> AppResult<Category> {
        self.repository.categories.get_by_id(id).await
    }

    pub async fn refresh(&self) -> AppResult<Vec<Category>> {
        let categories = self.api.categories_list().await?;
        self.repository.categories.replace_all(&categories).await?;
        Ok(categories)
    }

    pub async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        self.require_manager().await?;
        data.validate()?;

        let category = self.api.categories_create(data).await?;
        self.repository.categories.upsert(&category).await?;
        tracing::info!("Created category {} ({})", category.name, category.id);
        Ok(category)
    }

    pub async fn update(&self, id: &str, data: &UpdateCategory) -> AppResult<Category> {
        self.require_manager().await?;

        let category = self.api.categories_update(id, data).await?;
        self.repository.categories.upsert(&category).await?;
        Ok(category)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.require_manager().await?;

        self.api.categories_delete(id).await?;
        self.repository.categories.delete(id).await?;
        tracing::info!("Deleted category {}", id);
        Ok(())
    }

    // Categories are shared by every department
    async fn require_manager(&self) -> AppResult<()> {
        let user = self.api.session().require_user().await?;
        PermissionChecker::require_permission(&user, Permission::ViewEquipmentManagement, None)
    }
}
