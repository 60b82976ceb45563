//! Registration and borrow request approval

use crate::{
    api::ApiClient,
    error::{AppError, AppResult},
    models::{
        borrow::{BorrowHistoryEntry, BorrowStatus},
        registration::{RegistrationRequest, ReviewDecision},
        user::User,
    },
    permissions::{Permission, PermissionChecker},
    repository::Repository,
};

#[derive(Clone)]
pub struct ApprovalService {
    api: ApiClient,
    repository: Repository,
}

impl ApprovalService {
    pub fn new(api: ApiClient, repository: Repository) -> Self {
        Self { api, repository }
    }

    /// Pending signups the current user may decide on
    pub async fn pending_registrations(&self) -> AppResult<Vec<RegistrationRequest>> {
        let user = self.api.session().require_user().await?;
        PermissionChecker::require_permission(&user, Permission::ViewRegistrationApproval, None)?;

        let pending = self.api.registrations_pending().await?;
        self.repository.registrations.replace_all(&pending).await?;
        Ok(in_scope(&user, pending, |r| &r.department_id))
    }

    pub async fn approve_registration(&self, id: &str) -> AppResult<()> {
        let user = self.api.session().require_user().await?;
        self.check_registration(&user, id).await?;

        self.api.registrations_approve(id).await?;
        self.repository.registrations.delete(id).await?;
        tracing::info!("Registration {} approved by {}", id, user.id);
        Ok(())
    }

    pub async fn reject_registration(&self, id: &str, reason: Option<String>) -> AppResult<()> {
        let user = self.api.session().require_user().await?;
        self.check_registration(&user, id).await?;

        self.api
            .registrations_reject(id, &ReviewDecision { reason })
            .await?;
        self.repository.registrations.delete(id).await?;
        tracing::info!("Registration {} rejected by {}", id, user.id);
        Ok(())
    }

    /// Borrow requests waiting for approval in the user's scope. The whole
    /// server list is cached so later decisions can resolve any department.
    pub async fn pending_borrow_requests(&self) -> AppResult<Vec<BorrowHistoryEntry>> {
        let user = self.api.session().require_user().await?;
        PermissionChecker::require_permission(&user, Permission::ViewBorrowApproval, None)?;

        let requests = self.api.borrow_requests(BorrowStatus::Pending).await?;
        for request in &requests {
            self.repository.history.upsert(request).await?;
        }
        Ok(in_scope(&user, requests, |r| &r.department_id))
    }

    pub async fn approve_borrow_request(&self, id: &str) -> AppResult<BorrowHistoryEntry> {
        let user = self.api.session().require_user().await?;
        self.check_borrow_request(&user, id).await?;

        let entry = self.api.borrow_requests_approve(id).await?;
        self.repository.history.upsert(&entry).await?;
        tracing::info!("Borrow request {} approved by {}", id, user.id);
        Ok(entry)
    }

    pub async fn reject_borrow_request(&self, id: &str, reason: Option<String>) -> AppResult<BorrowHistoryEntry> {
        let user = self.api.session().require_user().await?;
        self.check_borrow_request(&user, id).await?;

        let entry = self
            .api
            .borrow_requests_reject(id, &ReviewDecision { reason })
            .await?;
        self.repository.history.upsert(&entry).await?;
        tracing::info!("Borrow request {} rejected by {}", id, user.id);
        Ok(entry)
    }

    /// The department comes from the cache, refreshed from the server when the
    /// registration is unknown. An unresolvable request is never approved.
    async fn check_registration(&self, user: &User, id: &str) -> AppResult<()> {
        PermissionChecker::require_permission(user, Permission::ViewRegistrationApproval, None)?;

        let registration = match self.repository.registrations.get_by_id(id).await {
            Err(AppError::NotFound(_)) => {
                let pending = self.api.registrations_pending().await?;
                self.repository.registrations.replace_all(&pending).await?;
                self.repository.registrations.get_by_id(id).await?
            }
            other => other?,
        };
        PermissionChecker::require_permission(
            user,
            Permission::ViewRegistrationApproval,
            Some(&registration.department_id),
        )
    }

    async fn check_borrow_request(&self, user: &User, id: &str) -> AppResult<()> {
        PermissionChecker::require_permission(user, Permission::ViewBorrowApproval, None)?;

        let entry = match self.repository.history.get_by_id(id).await {
            Err(AppError::NotFound(_)) => {
                let pending = self.api.borrow_requests(BorrowStatus::Pending).await?;
                for request in &pending {
                    self.repository.history.upsert(request).await?;
                }
                pending
                    .into_iter()
                    .find(|r| r.id == id)
                    .ok_or_else(|| AppError::NotFound(format!("Borrow request {} not found", id)))?
            }
            other => other?,
        };

        if entry.status != BorrowStatus::Pending {
            return Err(AppError::Validation(format!(
                "Borrow request {} is already {}",
                id, entry.status
            )));
        }
        PermissionChecker::require_permission(user, Permission::ViewBorrowApproval, Some(&entry.department_id))
    }
}

fn in_scope<T>(user: &User, rows: Vec<T>, department: impl Fn(&T) -> &String) -> Vec<T> {
    match PermissionChecker::department_scope(user) {
        None => rows,
        Some(scope) => rows.into_iter().filter(|r| department(r) == scope).collect(),
    }
}
