//! Business logic services
//!
//! Services call the server first and then mirror the result into the local
//! cache. Permission checks run before any request leaves the client.

pub mod approvals;
pub mod auth;
pub mod borrow;
pub mod categories;
pub mod departments;
pub mod equipment;
pub mod notifications;
pub mod sync;
pub mod users;
pub mod version;

use crate::{api::ApiClient, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub sync: sync::SyncService,
    pub equipment: equipment::EquipmentService,
    pub borrow: borrow::BorrowService,
    pub approvals: approvals::ApprovalService,
    pub departments: departments::DepartmentService,
    pub categories: categories::CategoryService,
    pub users: users::UserService,
    pub version: version::VersionService,
}

impl Services {
    /// Create all services over the given API client and cache
    pub fn new(api: ApiClient, repository: Repository) -> Self {
        Self {
            auth: auth::AuthService::new(api.clone(), repository.clone()),
            sync: sync::SyncService::new(api.clone(), repository.clone()),
            equipment: equipment::EquipmentService::new(api.clone(), repository.clone()),
            borrow: borrow::BorrowService::new(api.clone(), repository.clone()),
            approvals: approvals::ApprovalService::new(api.clone(), repository.clone()),
            departments: departments::DepartmentService::new(api.clone(), repository.clone()),
            categories: categories::CategoryService::new(api.clone(), repository.clone()),
            users: users::UserService::new(api.clone(), repository),
            version: version::VersionService::new(api),
        }
    }
}
