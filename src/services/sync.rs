//! Full cache refresh from the server

use serde::Serialize;

use crate::{
    api::ApiClient,
    error::AppResult,
    models::user::Role,
    permissions::{Permission, PermissionChecker},
    repository::Repository,
};

/// Row counts written by a sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub departments: usize,
    pub categories: usize,
    pub items: usize,
    /// None when the user may not see the user list
    pub users: Option<usize>,
    pub registrations: Option<usize>,
}

#[derive(Clone)]
pub struct SyncService {
    api: ApiClient,
    repository: Repository,
}

impl SyncService {
    pub fn new(api: ApiClient, repository: Repository) -> Self {
        Self { api, repository }
    }

    /// Replace every cached table with the server's current state
    pub async fn sync_all(&self) -> AppResult<SyncReport> {
        let user = self.api.session().require_user().await?;
        let mut report = SyncReport::default();

        let departments = self.api.departments_list().await?;
        self.repository.departments.replace_all(&departments).await?;
        report.departments = departments.len();

        let categories = self.api.categories_list().await?;
        self.repository.categories.replace_all(&categories).await?;
        report.categories = categories.len();

        let items = self.api.items_list().await?;
        self.repository.equipment.replace_all(&items).await?;
        report.items = items.len();

        if PermissionChecker::has_permission(&user, Permission::ViewUserManagement, None) {
            let users = self.api.users_list().await?;
            self.repository.users.replace_all(&users).await?;
            report.users = Some(users.len());
        }

        if PermissionChecker::has_permission(&user, Permission::ViewRegistrationApproval, None) {
            let pending = self.api.registrations_pending().await?;
            self.repository.registrations.replace_all(&pending).await?;
            report.registrations = Some(pending.len());
        }

        tracing::info!(
            departments = report.departments,
            categories = report.categories,
            items = report.items,
            "Cache synchronized"
        );
        Ok(report)
    }

    /// Refresh borrow history visible to the current user, returning the row count
    pub async fn sync_history(&self) -> AppResult<usize> {
        let user = self.api.session().require_user().await?;

        let own = self.api.borrow_history_for_user(&user.id).await?;
        self.repository.history.replace_for_borrower(&user.id, &own).await?;
        let mut total = own.len();

        if PermissionChecker::has_permission(&user, Permission::ViewDepartmentHistory, None) {
            let departments = match user.role {
                Role::SuperAdmin => self
                    .repository
                    .departments
                    .list()
                    .await?
                    .into_iter()
                    .map(|d| d.id)
                    .collect(),
                _ => vec![user.department_id.clone()],
            };

            for department_id in departments {
                let entries = self.api.borrow_history_for_department(&department_id).await?;
                self.repository
                    .history
                    .replace_for_department(&department_id, &entries)
                    .await?;
                total += entries.len();
            }
        }

        Ok(total)
    }
}
