//! Borrowing and returning equipment with photo evidence

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    api::ApiClient,
    error::{AppError, AppResult},
    models::borrow::{BorrowHistoryEntry, BorrowRequest, PhotoUpload, ReturnRequest},
    permissions::{Permission, PermissionChecker},
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowService {
    api: ApiClient,
    repository: Repository,
}

impl BorrowService {
    pub fn new(api: ApiClient, repository: Repository) -> Self {
        Self { api, repository }
    }

    /// Borrow `quantity` units of an item. The photo is uploaded first and its
    /// URL attached to the request.
    pub async fn borrow(
        &self,
        item_id: &str,
        quantity: i64,
        expected_return_date: DateTime<Utc>,
        photo: &PhotoUpload,
        note: Option<String>,
    ) -> AppResult<BorrowHistoryEntry> {
        let user = self.api.session().require_user().await?;
        PermissionChecker::require_permission(&user, Permission::BorrowEquipment, None)?;

        let item = match self.repository.equipment.get_by_id(item_id).await {
            Ok(item) => item,
            Err(AppError::NotFound(_)) => self.api.items_get(item_id).await?,
            Err(e) => return Err(e),
        };
        if !item.can_borrow(quantity) {
            return Err(AppError::Validation(format!(
                "Only {} of {} available",
                item.available_quantity.max(0),
                item.name
            )));
        }
        if expected_return_date <= Utc::now() {
            return Err(AppError::Validation(
                "Expected return date must be in the future".to_string(),
            ));
        }

        let photo_url = self.api.files_upload(photo).await?;
        let request = BorrowRequest {
            quantity,
            expected_return_date,
            photo_url,
            note,
        };
        request.validate()?;

        let entry = self.api.borrow_item(item_id, &request).await?;
        self.repository.history.upsert(&entry).await?;
        self.refresh_item(item_id).await;

        tracing::info!("Borrow {} created for {} x{}", entry.id, item.name, quantity);
        Ok(entry)
    }

    /// Return a borrowed item with a photo of its state
    pub async fn return_item(
        &self,
        entry_id: &str,
        photo: &PhotoUpload,
        note: Option<String>,
    ) -> AppResult<BorrowHistoryEntry> {
        let user = self.api.session().require_user().await?;
        let entry = self.repository.history.get_by_id(entry_id).await?;

        if !entry.status.is_active() {
            return Err(AppError::Validation(format!(
                "Borrow {} is not outstanding ({})",
                entry.id, entry.status
            )));
        }
        if entry.borrower_id != user.id {
            PermissionChecker::require_permission(
                &user,
                Permission::ViewBorrowApproval,
                Some(&entry.department_id),
            )?;
        }

        let photo_url = self.api.files_upload(photo).await?;
        let returned = self
            .api
            .borrow_return(entry_id, &ReturnRequest { photo_url, note })
            .await?;
        self.repository.history.upsert(&returned).await?;
        self.refresh_item(&returned.item_id).await;

        tracing::info!("Borrow {} returned ({})", returned.id, returned.status);
        Ok(returned)
    }

    /// Own history from the server, or from the cache when offline
    pub async fn own_history(&self) -> AppResult<Vec<BorrowHistoryEntry>> {
        let user = self.api.session().require_user().await?;
        PermissionChecker::require_permission(&user, Permission::ViewOwnHistory, None)?;

        match self.api.borrow_history_for_user(&user.id).await {
            Ok(entries) => {
                self.repository.history.replace_for_borrower(&user.id, &entries).await?;
                self.repository.history.list_for_borrower(&user.id).await
            }
            Err(e) if e.is_network() => {
                tracing::warn!("Serving cached history: {}", e);
                self.repository.history.list_for_borrower(&user.id).await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn department_history(&self, department_id: &str) -> AppResult<Vec<BorrowHistoryEntry>> {
        let user = self.api.session().require_user().await?;
        PermissionChecker::require_permission(&user, Permission::ViewDepartmentHistory, Some(department_id))?;

        match self.api.borrow_history_for_department(department_id).await {
            Ok(entries) => {
                self.repository
                    .history
                    .replace_for_department(department_id, &entries)
                    .await?;
                self.repository.history.list_for_department(department_id).await
            }
            Err(e) if e.is_network() => {
                tracing::warn!("Serving cached department history: {}", e);
                self.repository.history.list_for_department(department_id).await
            }
            Err(e) => Err(e),
        }
    }

    /// Availability changed server side; a failed refresh only leaves the cache stale
    async fn refresh_item(&self, item_id: &str) {
        match self.api.items_get(item_id).await {
            Ok(item) => {
                if let Err(e) = self.repository.equipment.upsert(&item).await {
                    tracing::warn!("Failed to cache item {}: {}", item_id, e);
                }
            }
            Err(e) => tracing::warn!("Failed to refresh item {}: {}", item_id, e),
        }
    }
}
