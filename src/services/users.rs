//! User management service

use validator::Validate;

use crate::{
    api::ApiClient,
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, UpdateUser, User},
    permissions::{Permission, PermissionChecker},
    repository::Repository,
};

#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
    repository: Repository,
}

impl UserService {
    pub fn new(api: ApiClient, repository: Repository) -> Self {
        Self { api, repository }
    }

    /// Cached users visible to the current user
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let user = self.api.session().require_user().await?;
        PermissionChecker::require_permission(&user, Permission::ViewUserManagement, None)?;
        self.repository
            .users
            .list(PermissionChecker::department_scope(&user))
            .await
    }

    pub async fn refresh(&self) -> AppResult<Vec<User>> {
        let user = self.api.session().require_user().await?;
        PermissionChecker::require_permission(&user, Permission::ViewUserManagement, None)?;

        let users = self.api.users_list().await?;
        self.repository.users.replace_all(&users).await?;
        self.repository
            .users
            .list(PermissionChecker::department_scope(&user))
            .await
    }

    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let user = self.api.session().require_user().await?;
        PermissionChecker::require_permission(&user, Permission::ViewUserManagement, Some(&data.department_id))?;
        require_grantable(&user, data.role)?;
        data.validate()?;

        let created = self.api.users_create(data).await?.without_secrets();
        self.repository.users.upsert(&created).await?;
        tracing::info!("Created user {} ({}) as {}", created.name, created.id, created.role);
        Ok(created)
    }

    pub async fn update(&self, id: &str, data: &UpdateUser) -> AppResult<User> {
        let user = self.api.session().require_user().await?;
        let target = self.repository.users.get_by_id(id).await?;
        PermissionChecker::require_permission(&user, Permission::ViewUserManagement, Some(&target.department_id))?;

        // Nobody may edit an account that outranks them
        require_grantable(&user, target.role)?;
        if let Some(role) = data.role {
            require_grantable(&user, role)?;
        }
        if let Some(department) = &data.department_id {
            PermissionChecker::require_permission(&user, Permission::ViewUserManagement, Some(department))?;
        }
        if let Some(password) = &data.password {
            if password.len() < 6 {
                return Err(AppError::Validation(
                    "Password must be at least 6 characters".to_string(),
                ));
            }
        }

        let updated = self.api.users_update(id, data).await?.without_secrets();
        self.repository.users.upsert(&updated).await?;
        self.api.session().refresh_user(updated.clone()).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let user = self.api.session().require_user().await?;
        if user.id == id {
            return Err(AppError::Validation("You cannot delete your own account".to_string()));
        }
        let target = self.repository.users.get_by_id(id).await?;
        PermissionChecker::require_permission(&user, Permission::ViewUserManagement, Some(&target.department_id))?;
        require_grantable(&user, target.role)?;

        self.api.users_delete(id).await?;
        self.repository.users.delete(id).await?;
        tracing::info!("Deleted user {}", id);
        Ok(())
    }
}

fn require_grantable(user: &User, role: Role) -> AppResult<()> {
    if role.rank() > user.role.rank() {
        return Err(AppError::PermissionDenied(format!(
            "Role {} cannot manage {} accounts",
            user.role, role
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{logged_in, user};
    use axum::{
        extract::Path,
        http::StatusCode,
        routing::{post, put},
        Json, Router,
    };
    use serde_json::{json, Value};

    fn router() -> Router {
        Router::new()
            .route(
                "/users",
                post(|Json(body): Json<Value>| async move {
                    assert!(body.get("password").is_some());
                    (
                        StatusCode::CREATED,
                        Json(json!({
                            "id": "new", "name": body["name"], "contact": body["contact"],
                            "departmentId": body["departmentId"], "role": body["role"],
                            "status": "ACTIVE", "password": body["password"]
                        })),
                    )
                }),
            )
            .route(
                "/users/:id",
                put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    Json(json!({
                        "id": id, "name": body["name"].as_str().unwrap_or("Same"),
                        "contact": "c@example.org", "departmentId": "A",
                        "role": body["role"].as_str().unwrap_or("NORMAL_USER")
                    }))
                })
                .delete(|| async { StatusCode::NO_CONTENT }),
            )
    }

    fn new_user(role: Role, department: &str) -> CreateUser {
        CreateUser {
            name: "Dan".into(),
            contact: "dan@example.org".into(),
            department_id: department.into(),
            role,
            password: "secret1".into(),
        }
    }

    #[tokio::test]
    async fn test_create_strips_password_and_checks_scope() {
        let (api, repository) = logged_in(router(), user("alice", Role::Admin, "A")).await;
        let service = UserService::new(api, repository.clone());

        let created = service.create(&new_user(Role::AdvancedUser, "A")).await.unwrap();
        assert!(created.password.is_none());
        assert_eq!(repository.users.get_by_id("new").await.unwrap().role, Role::AdvancedUser);

        assert!(matches!(
            service.create(&new_user(Role::NormalUser, "B")).await,
            Err(AppError::PermissionDenied(_))
        ));
        assert!(matches!(
            service.create(&new_user(Role::SuperAdmin, "A")).await,
            Err(AppError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_rules() {
        let (api, repository) = logged_in(router(), user("alice", Role::Admin, "A")).await;
        repository.users.upsert(&user("bob", Role::NormalUser, "A")).await.unwrap();
        repository.users.upsert(&user("root", Role::SuperAdmin, "A")).await.unwrap();
        let service = UserService::new(api, repository.clone());

        let promote = UpdateUser {
            role: Some(Role::AdvancedUser),
            ..Default::default()
        };
        assert_eq!(service.update("bob", &promote).await.unwrap().role, Role::AdvancedUser);

        assert!(matches!(
            service.update("root", &UpdateUser::default()).await,
            Err(AppError::PermissionDenied(_))
        ));
        assert!(matches!(service.delete("alice").await, Err(AppError::Validation(_))));

        service.delete("bob").await.unwrap();
        assert!(repository.users.get_by_id("bob").await.is_err());
    }

    #[tokio::test]
    async fn test_list_is_scoped() {
        let (api, repository) = logged_in(router(), user("alice", Role::Admin, "A")).await;
        repository
            .users
            .replace_all(&[user("bob", Role::NormalUser, "A"), user("carol", Role::NormalUser, "B")])
            .await
            .unwrap();
        let service = UserService::new(api, repository);

        let visible = service.list().await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "bob");
    }
}
