//! Borrow history model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Lifecycle of a borrow record, from request to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BorrowStatus {
    Borrowing,
    OverdueNotReturned,
    Returned,
    OverdueReturned,
    Pending,
    Approved,
    Rejected,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Borrowing => "BORROWING",
            BorrowStatus::OverdueNotReturned => "OVERDUE_NOT_RETURNED",
            BorrowStatus::Returned => "RETURNED",
            BorrowStatus::OverdueReturned => "OVERDUE_RETURNED",
            BorrowStatus::Pending => "PENDING",
            BorrowStatus::Approved => "APPROVED",
            BorrowStatus::Rejected => "REJECTED",
        }
    }

    /// Equipment is currently out of the shelf
    pub fn is_active(&self) -> bool {
        matches!(self, BorrowStatus::Borrowing | BorrowStatus::OverdueNotReturned)
    }

    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            BorrowStatus::Returned | BorrowStatus::OverdueReturned | BorrowStatus::Rejected
        )
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One equipment loan with its evidence photos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BorrowHistoryEntry {
    pub id: String,
    pub item_id: String,
    pub item_name: String,
    pub borrower_id: String,
    pub borrower_name: String,
    /// Administrator who approved or recorded the operation
    #[serde(default)]
    pub operator_id: Option<String>,
    #[serde(default)]
    pub operator_name: Option<String>,
    pub department_id: String,
    pub quantity: i64,
    pub borrow_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    #[serde(default)]
    pub actual_return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    #[serde(default)]
    pub borrow_photo_url: Option<String>,
    #[serde(default)]
    pub return_photo_url: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl BorrowHistoryEntry {
    /// Still out and past its expected return date
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == BorrowStatus::OverdueNotReturned
            || (self.status.is_active() && self.expected_return_date < now)
    }
}

/// Borrow request payload
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
    pub expected_return_date: DateTime<Utc>,
    /// URL returned by the upload endpoint
    pub photo_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Return payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub photo_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A photo to upload as evidence
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    pub fn jpeg(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: "image/jpeg".to_string(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}
