//! Role based permissions
//!
//! A static matrix maps each [`Role`] to the screens/actions it may use.
//! Department-bound permissions add one scoping rule: a super administrator
//! may act on any department, every other role only on its own.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, User},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    ViewRegistrationApproval,
    ViewBorrowApproval,
    ViewUserManagement,
    ViewDepartmentManagement,
    ViewEquipmentManagement,
    ViewDepartmentHistory,
    BorrowEquipment,
    ViewOwnHistory,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::ViewRegistrationApproval,
        Permission::ViewBorrowApproval,
        Permission::ViewUserManagement,
        Permission::ViewDepartmentManagement,
        Permission::ViewEquipmentManagement,
        Permission::ViewDepartmentHistory,
        Permission::BorrowEquipment,
        Permission::ViewOwnHistory,
    ];

    /// Whether the permission applies to a specific department
    pub fn is_department_bound(&self) -> bool {
        !matches!(self, Permission::BorrowEquipment | Permission::ViewOwnHistory)
    }
}

/// Role → permission lookup table
pub struct RolePermissionsMatrix;

static MATRIX: Lazy<HashMap<Role, HashSet<Permission>>> = Lazy::new(|| {
    use Permission::*;

    let admin: HashSet<Permission> = Permission::ALL.into_iter().collect();
    let advanced: HashSet<Permission> = [
        ViewBorrowApproval,
        ViewEquipmentManagement,
        ViewDepartmentHistory,
        BorrowEquipment,
        ViewOwnHistory,
    ]
    .into_iter()
    .collect();
    let normal: HashSet<Permission> = [BorrowEquipment, ViewOwnHistory].into_iter().collect();

    HashMap::from([
        (Role::SuperAdmin, admin.clone()),
        (Role::Admin, admin),
        (Role::AdvancedUser, advanced),
        (Role::NormalUser, normal),
    ])
});

impl RolePermissionsMatrix {
    pub fn role_has(role: Role, permission: Permission) -> bool {
        MATRIX
            .get(&role)
            .map(|set| set.contains(&permission))
            .unwrap_or(false)
    }

    /// Permissions granted to a role, in declaration order
    pub fn permissions_for(role: Role) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|p| Self::role_has(role, *p))
            .collect()
    }
}

/// Stateless permission checks against the matrix
pub struct PermissionChecker;

impl PermissionChecker {
    /// Whether `user` holds `permission`, optionally scoped to a department
    pub fn has_permission(user: &User, permission: Permission, target_department_id: Option<&str>) -> bool {
        if !user.is_active() || !RolePermissionsMatrix::role_has(user.role, permission) {
            return false;
        }

        match target_department_id {
            Some(target) if permission.is_department_bound() => {
                user.role == Role::SuperAdmin || user.department_id == target
            }
            _ => true,
        }
    }

    pub fn require_permission(
        user: &User,
        permission: Permission,
        target_department_id: Option<&str>,
    ) -> AppResult<()> {
        if Self::has_permission(user, permission, target_department_id) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(match target_department_id {
                Some(dept) => format!("{:?} on department {} for role {}", permission, dept, user.role),
                None => format!("{:?} for role {}", permission, user.role),
            }))
        }
    }

    /// Department a listing should be restricted to, None meaning every department
    pub fn department_scope(user: &User) -> Option<&str> {
        match user.role {
            Role::SuperAdmin => None,
            _ => Some(user.department_id.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserStatus;

    fn user(role: Role, department: &str) -> User {
        User {
            id: format!("{}-{}", role, department),
            name: "Test".into(),
            contact: "test@example.org".into(),
            department_id: department.into(),
            role,
            status: UserStatus::Active,
            password: None,
            invitation_code: None,
        }
    }

    #[test]
    fn test_matrix_table() {
        use Permission::*;
        let expected: [(Permission, [bool; 4]); 8] = [
            (ViewRegistrationApproval, [true, true, false, false]),
            (ViewBorrowApproval, [true, true, true, false]),
            (ViewUserManagement, [true, true, false, false]),
            (ViewDepartmentManagement, [true, true, false, false]),
            (ViewEquipmentManagement, [true, true, true, false]),
            (ViewDepartmentHistory, [true, true, true, false]),
            (BorrowEquipment, [true, true, true, true]),
            (ViewOwnHistory, [true, true, true, true]),
        ];

        for (permission, row) in expected {
            for (role, allowed) in Role::ALL.into_iter().zip(row) {
                assert_eq!(
                    PermissionChecker::has_permission(&user(role, "A"), permission, None),
                    allowed,
                    "{:?} / {:?}",
                    role,
                    permission
                );
            }
        }
    }

    #[test]
    fn test_department_scoping() {
        let admin = user(Role::Admin, "A");
        assert!(!PermissionChecker::has_permission(&admin, Permission::ViewDepartmentManagement, Some("B")));
        assert!(PermissionChecker::has_permission(&admin, Permission::ViewDepartmentManagement, Some("A")));

        let super_admin = user(Role::SuperAdmin, "A");
        assert!(PermissionChecker::has_permission(&super_admin, Permission::ViewDepartmentManagement, Some("B")));
    }

    #[test]
    fn test_scoping_for_every_bound_permission() {
        for permission in Permission::ALL.into_iter().filter(|p| p.is_department_bound()) {
            for role in Role::ALL {
                let u = user(role, "A");
                let granted = RolePermissionsMatrix::role_has(role, permission);
                assert_eq!(PermissionChecker::has_permission(&u, permission, Some("A")), granted);
                assert_eq!(
                    PermissionChecker::has_permission(&u, permission, Some("B")),
                    granted && role == Role::SuperAdmin
                );
            }
        }
    }

    #[test]
    fn test_unbound_permissions_ignore_target() {
        let normal = user(Role::NormalUser, "A");
        assert!(PermissionChecker::has_permission(&normal, Permission::BorrowEquipment, Some("B")));
        assert!(PermissionChecker::has_permission(&normal, Permission::ViewOwnHistory, Some("B")));
    }

    #[test]
    fn test_inactive_user_has_nothing() {
        let mut pending = user(Role::SuperAdmin, "A");
        pending.status = UserStatus::Pending;
        assert!(!PermissionChecker::has_permission(&pending, Permission::BorrowEquipment, None));
        assert!(PermissionChecker::require_permission(&pending, Permission::ViewOwnHistory, None).is_err());
    }

    #[test]
    fn test_permissions_for_and_scope() {
        assert_eq!(
            RolePermissionsMatrix::permissions_for(Role::NormalUser),
            vec![Permission::BorrowEquipment, Permission::ViewOwnHistory]
        );
        assert_eq!(RolePermissionsMatrix::permissions_for(Role::Admin).len(), 8);
        assert_eq!(PermissionChecker::department_scope(&user(Role::SuperAdmin, "A")), None);
        assert_eq!(PermissionChecker::department_scope(&user(Role::Admin, "A")), Some("A"));
    }
}
