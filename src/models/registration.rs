//! Registration (pending signup) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

use super::REDACTED;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

/// A signup waiting for an administrator decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub id: String,
    pub name: String,
    pub contact: String,
    pub department_id: String,
    pub invitation_code: String,
    #[serde(default)]
    pub requested_at: Option<DateTime<Utc>>,
    pub status: RegistrationStatus,
}

/// Signup payload, gated by an invitation code
#[derive(Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 3, message = "Contact must be at least 3 characters"))]
    pub contact: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Department is required"))]
    pub department_id: String,
    #[validate(length(min = 1, message = "Invitation code is required"))]
    pub invitation_code: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("contact", &self.contact)
            .field("password", &REDACTED)
            .field("department_id", &self.department_id)
            .field("invitation_code", &self.invitation_code)
            .finish()
    }
}

/// Optional reason attached to a rejection
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDecision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
