//! Equipment service

use validator::Validate;

use crate::{
    api::ApiClient,
    error::{AppError, AppResult},
    models::equipment::{CreateEquipment, EquipmentItem, UpdateEquipment},
    permissions::{Permission, PermissionChecker},
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    api: ApiClient,
    repository: Repository,
}

impl EquipmentService {
    pub fn new(api: ApiClient, repository: Repository) -> Self {
        Self { api, repository }
    }

    /// Cached items, optionally filtered
    pub async fn list(&self, category_id: Option<&str>, department_id: Option<&str>) -> AppResult<Vec<EquipmentItem>> {
        self.repository.equipment.list(category_id, department_id).await
    }

    pub async fn search(&self, term: &str) -> AppResult<Vec<EquipmentItem>> {
        self.repository.equipment.search(term).await
    }

    /// Cached item, falling back to the server when it is not cached yet
    pub async fn get(&self, id: &str) -> AppResult<EquipmentItem> {
        match self.repository.equipment.get_by_id(id).await {
            Ok(item) => Ok(item),
            Err(AppError::NotFound(_)) => {
                let item = self.api.items_get(id).await?;
                self.repository.equipment.upsert(&item).await?;
                Ok(item)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn refresh(&self) -> AppResult<Vec<EquipmentItem>> {
        let items = self.api.items_list().await?;
        self.repository.equipment.replace_all(&items).await?;
        Ok(items)
    }

    /// Re-read one item from the server (after a borrow or return)
    pub async fn refresh_one(&self, id: &str) -> AppResult<EquipmentItem> {
        let item = self.api.items_get(id).await?;
        self.repository.equipment.upsert(&item).await?;
        Ok(item)
    }

    pub async fn create(&self, data: &CreateEquipment) -> AppResult<EquipmentItem> {
        let user = self.api.session().require_user().await?;
        PermissionChecker::require_permission(
            &user,
            Permission::ViewEquipmentManagement,
            Some(&data.department_id),
        )?;
        data.validate()?;

        let item = self.api.items_create(data).await?;
        self.repository.equipment.upsert(&item).await?;
        tracing::info!("Created equipment {} ({})", item.name, item.id);
        Ok(item)
    }

    pub async fn update(&self, id: &str, data: &UpdateEquipment) -> AppResult<EquipmentItem> {
        let user = self.api.session().require_user().await?;
        let current = self.get(id).await?;
        PermissionChecker::require_permission(
            &user,
            Permission::ViewEquipmentManagement,
            Some(&current.department_id),
        )?;

        let item = self.api.items_update(id, data).await?;
        self.repository.equipment.upsert(&item).await?;
        Ok(item)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let user = self.api.session().require_user().await?;
        let current = self.get(id).await?;
        PermissionChecker::require_permission(
            &user,
            Permission::ViewEquipmentManagement,
            Some(&current.department_id),
        )?;

        self.api.items_delete(id).await?;
        self.repository.equipment.delete(id).await?;
        tracing::info!("Deleted equipment {}", id);
        Ok(())
    }
}
