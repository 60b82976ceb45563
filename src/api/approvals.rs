//! Registration and borrow request approval endpoints

use super::ApiClient;
use crate::{
    error::AppResult,
    models::{
        borrow::{BorrowHistoryEntry, BorrowStatus},
        registration::{RegistrationRequest, ReviewDecision},
    },
};

impl ApiClient {
    pub async fn registrations_pending(&self) -> AppResult<Vec<RegistrationRequest>> {
        self.get_json_query(&["registrations"], &[("status", "PENDING")]).await
    }

    pub async fn registrations_approve(&self, id: &str) -> AppResult<()> {
        self.post_empty(&["registrations", id, "approve"], &ReviewDecision::default())
            .await
    }

    pub async fn registrations_reject(&self, id: &str, decision: &ReviewDecision) -> AppResult<()> {
        self.post_empty(&["registrations", id, "reject"], decision).await
    }

    /// Borrow requests in the given state (PENDING or APPROVED in practice)
    pub async fn borrow_requests(&self, status: BorrowStatus) -> AppResult<Vec<BorrowHistoryEntry>> {
        self.get_json_query(&["borrow-requests"], &[("status", status.as_str())]).await
    }

    pub async fn borrow_requests_approve(&self, id: &str) -> AppResult<BorrowHistoryEntry> {
        self.post_json(&["borrow-requests", id, "approve"], &ReviewDecision::default())
            .await
    }

    pub async fn borrow_requests_reject(&self, id: &str, decision: &ReviewDecision) -> AppResult<BorrowHistoryEntry> {
        self.post_json(&["borrow-requests", id, "reject"], decision).await
    }
}
