//! Department hierarchy management

use validator::Validate;

use crate::{
    api::ApiClient,
    error::{AppError, AppResult},
    models::department::{CreateDepartment, Department, DepartmentTree, UpdateDepartment},
    models::user::User,
    permissions::{Permission, PermissionChecker},
    repository::Repository,
};

#[derive(Clone)]
pub struct DepartmentService {
    api: ApiClient,
    repository: Repository,
}

impl DepartmentService {
    pub fn new(api: ApiClient, repository: Repository) -> Self {
        Self { api, repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Department>> {
        self.repository.departments.list().await
    }

    pub async fn children(&self, id: &str) -> AppResult<Vec<Department>> {
        self.repository.departments.children(id).await
    }

    pub async fn refresh(&self) -> AppResult<Vec<Department>> {
        let departments = self.api.departments_list().await?;
        self.repository.departments.replace_all(&departments).await?;
        Ok(departments)
    }

    /// Create a department. A root department can only be created by a user
    /// whose scope covers every department.
    pub async fn create(&self, data: &CreateDepartment) -> AppResult<Department> {
        let user = self.api.session().require_user().await?;
        data.validate()?;

        match data.parent_id.as_deref() {
            Some(parent) => {
                PermissionChecker::require_permission(&user, Permission::ViewDepartmentManagement, Some(parent))?;
                self.repository.departments.get_by_id(parent).await?;
            }
            None => require_global(&user)?,
        }

        let department = self.api.departments_create(data).await?;
        self.repository.departments.upsert(&department).await?;
        tracing::info!("Created department {} ({})", department.name, department.id);
        Ok(department)
    }

    pub async fn update(&self, id: &str, data: &UpdateDepartment) -> AppResult<Department> {
        let user = self.api.session().require_user().await?;
        PermissionChecker::require_permission(&user, Permission::ViewDepartmentManagement, Some(id))?;

        if let Some(name) = &data.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("Department name is required".to_string()));
            }
        }

        match &data.parent_id {
            Some(Some(parent)) => {
                if parent == id {
                    return Err(AppError::Validation(
                        "A department cannot be its own parent".to_string(),
                    ));
                }
                PermissionChecker::require_permission(&user, Permission::ViewDepartmentManagement, Some(parent))?;
                let departments = self.repository.departments.list().await?;
                let tree = DepartmentTree::new(&departments);
                if tree.get(parent).is_none() {
                    return Err(AppError::NotFound(format!("Department {} not found", parent)));
                }
                if tree.would_create_cycle(id, parent) {
                    return Err(AppError::Validation(format!(
                        "Moving department {} under {} would create a cycle",
                        id, parent
                    )));
                }
            }
            Some(None) => require_global(&user)?,
            None => {}
        }

        let department = self.api.departments_update(id, data).await?;
        self.repository.departments.upsert(&department).await?;
        Ok(department)
    }

    /// Delete a department that has no sub-departments
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let user = self.api.session().require_user().await?;
        PermissionChecker::require_permission(&user, Permission::ViewDepartmentManagement, Some(id))?;

        let children = self.repository.departments.children(id).await?;
        if !children.is_empty() {
            return Err(AppError::Validation(format!(
                "Department {} still has {} sub-department(s)",
                id,
                children.len()
            )));
        }

        self.api.departments_delete(id).await?;
        self.repository.departments.delete(id).await?;
        tracing::info!("Deleted department {}", id);
        Ok(())
    }
}

fn require_global(user: &User) -> AppResult<()> {
    PermissionChecker::require_permission(user, Permission::ViewDepartmentManagement, None)?;
    if PermissionChecker::department_scope(user).is_some() {
        return Err(AppError::PermissionDenied(
            "Only a super administrator can manage root departments".to_string(),
        ));
    }
    Ok(())
}
