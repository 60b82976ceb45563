//! User model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

use super::REDACTED;

/// Fixed permission tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    AdvancedUser,
    NormalUser,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::Admin, Role::AdvancedUser, Role::NormalUser];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::AdvancedUser => "ADVANCED_USER",
            Role::NormalUser => "NORMAL_USER",
        }
    }

    /// Higher outranks lower; a user may only grant roles at or below their own
    pub fn rank(&self) -> u8 {
        match self {
            Role::SuperAdmin => 3,
            Role::Admin => 2,
            Role::AdvancedUser => 1,
            Role::NormalUser => 0,
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super administrator",
            Role::Admin => "Administrator",
            Role::AdvancedUser => "Advanced user",
            Role::NormalUser => "User",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            "ADMIN" => Ok(Role::Admin),
            "ADVANCED_USER" => Ok(Role::AdvancedUser),
            "NORMAL_USER" => Ok(Role::NormalUser),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    #[default]
    Active,
    /// Registered, waiting for approval
    Pending,
    Disabled,
}

/// User record
#[derive(Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    /// Phone number or email used to log in
    pub contact: String,
    pub department_id: String,
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
    /// Only ever sent when creating or resetting an account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitation_code: Option<String>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Copy safe to persist or log
    pub fn without_secrets(&self) -> Self {
        Self {
            password: None,
            ..self.clone()
        }
    }
}

/// Create user request (admin)
#[derive(Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 3, message = "Contact must be at least 3 characters"))]
    pub contact: String,
    pub department_id: String,
    pub role: Role,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Update user request
#[derive(Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn redacted(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| REDACTED)
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("contact", &self.contact)
            .field("department_id", &self.department_id)
            .field("role", &self.role)
            .field("status", &self.status)
            .field("password", &redacted(&self.password))
            .field("invitation_code", &self.invitation_code)
            .finish()
    }
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("name", &self.name)
            .field("contact", &self.contact)
            .field("department_id", &self.department_id)
            .field("role", &self.role)
            .field("password", &REDACTED)
            .finish()
    }
}

impl fmt::Debug for UpdateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUser")
            .field("name", &self.name)
            .field("contact", &self.contact)
            .field("department_id", &self.department_id)
            .field("role", &self.role)
            .field("status", &self.status)
            .field("password", &redacted(&self.password))
            .finish()
    }
}
