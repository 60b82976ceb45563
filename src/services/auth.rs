//! Login, signup and logout

use validator::Validate;

use crate::{
    api::ApiClient,
    error::{AppError, AppResult},
    models::{
        auth::LoginRequest,
        registration::{RegistrationRequest, SignupRequest},
        user::{User, UserStatus},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    repository: Repository,
}

impl AuthService {
    pub fn new(api: ApiClient, repository: Repository) -> Self {
        Self { api, repository }
    }

    /// Authenticate and open a session
    pub async fn login(&self, contact: &str, password: &str) -> AppResult<User> {
        let request = LoginRequest {
            contact: contact.trim().to_string(),
            password: password.to_string(),
        };
        request.validate()?;

        let response = self.api.auth_login(&request).await?;
        match response.user.status {
            UserStatus::Active => {}
            UserStatus::Pending => {
                return Err(AppError::Validation(
                    "Your registration is waiting for approval".to_string(),
                ))
            }
            UserStatus::Disabled => {
                return Err(AppError::Validation("This account has been disabled".to_string()))
            }
        }

        let user = response.user.without_secrets();
        self.api.session().start(response.token, user.clone()).await;
        self.repository.users.upsert(&user).await?;

        tracing::info!("Logged in as {} ({})", user.name, user.role);
        Ok(user)
    }

    /// Submit a registration; no session is opened
    pub async fn signup(&self, request: &SignupRequest) -> AppResult<RegistrationRequest> {
        request.validate()?;
        let registration = self.api.auth_signup(request).await?;
        tracing::info!("Registration {} submitted for department {}", registration.id, registration.department_id);
        Ok(registration)
    }

    /// End the session and drop everything cached for it
    pub async fn logout(&self) -> AppResult<()> {
        self.api.session().end().await;
        self.repository.clear_all().await
    }

    pub async fn current_user(&self) -> Option<User> {
        self.api.session().current_user().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::services::test_support::{client_for, user};
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    fn router() -> Router {
        Router::new().route(
            "/auth/login",
            post(|Json(body): Json<Value>| async move {
                match (body["contact"].as_str(), body["password"].as_str()) {
                    (Some("alice"), Some("right")) => Ok(Json(json!({
                        "token": "t-1",
                        "user": user("alice", Role::Admin, "A"),
                    }))),
                    (Some("pending"), _) => {
                        let mut u = user("pending", Role::NormalUser, "A");
                        u.status = UserStatus::Pending;
                        Ok(Json(json!({ "token": "t-2", "user": u })))
                    }
                    _ => Err((StatusCode::UNAUTHORIZED, Json(json!({"message": "Wrong password"})))),
                }
            }),
        )
    }

    #[tokio::test]
    async fn test_login_opens_session_and_caches_user() {
        let api = client_for(router()).await;
        let repository = Repository::in_memory().await.unwrap();
        let auth = AuthService::new(api.clone(), repository.clone());

        let logged = auth.login(" alice ", "right").await.unwrap();
        assert_eq!(logged.role, Role::Admin);
        assert_eq!(api.session().token().await.as_deref(), Some("t-1"));
        assert_eq!(repository.users.get_by_id("alice").await.unwrap().name, "ALICE");

        auth.logout().await.unwrap();
        assert!(auth.current_user().await.is_none());
        assert!(repository.users.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_failures() {
        let api = client_for(router()).await;
        let auth = AuthService::new(api.clone(), Repository::in_memory().await.unwrap());

        let err = auth.login("alice", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::Http { status: 401, ref message } if message == "Wrong password"));

        let err = auth.login("pending", "x").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!api.session().is_logged_in().await);

        assert!(matches!(auth.login("", "x").await, Err(AppError::Validation(_))));
    }
}
