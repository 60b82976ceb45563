//! Authentication endpoints

use reqwest::Method;

use super::ApiClient;
use crate::{
    error::AppResult,
    models::{
        auth::{LoginRequest, LoginResponse},
        registration::{RegistrationRequest, SignupRequest},
    },
};

impl ApiClient {
    /// POST auth/login
    pub async fn auth_login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        let builder = self.anonymous(Method::POST, &["auth", "login"])?.json(request);
        self.execute_json(builder).await
    }

    /// POST auth/signup; the account stays pending until approved
    pub async fn auth_signup(&self, request: &SignupRequest) -> AppResult<RegistrationRequest> {
        let builder = self.anonymous(Method::POST, &["auth", "signup"])?.json(request);
        self.execute_json(builder).await
    }
}
