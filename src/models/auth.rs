//! Authentication payloads

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::{user::User, REDACTED};

#[derive(Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Contact is required"))]
    pub contact: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("contact", &self.contact)
            .field("password", &REDACTED)
            .finish()
    }
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &REDACTED)
            .field("user", &self.user)
            .finish()
    }
}
