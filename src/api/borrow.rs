//! Borrow, return and history endpoints

use super::ApiClient;
use crate::{
    error::AppResult,
    models::borrow::{BorrowHistoryEntry, BorrowRequest, ReturnRequest},
};

impl ApiClient {
    /// POST items/{id}/borrow
    pub async fn borrow_item(&self, item_id: &str, request: &BorrowRequest) -> AppResult<BorrowHistoryEntry> {
        self.post_json(&["items", item_id, "borrow"], request).await
    }

    /// POST borrow-history/{id}/return
    pub async fn borrow_return(&self, entry_id: &str, request: &ReturnRequest) -> AppResult<BorrowHistoryEntry> {
        self.post_json(&["borrow-history", entry_id, "return"], request).await
    }

    pub async fn borrow_history_for_user(&self, user_id: &str) -> AppResult<Vec<BorrowHistoryEntry>> {
        self.get_json_query(&["borrow-history"], &[("userId", user_id)]).await
    }

    pub async fn borrow_history_for_department(&self, department_id: &str) -> AppResult<Vec<BorrowHistoryEntry>> {
        self.get_json_query(&["borrow-history"], &[("departmentId", department_id)]).await
    }
}
