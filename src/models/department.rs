//! Department model and hierarchy helpers

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::{HashMap, HashSet};
use validator::Validate;

/// Department record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    /// Parent department, None for a root
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Create department request
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartment {
    #[validate(length(min = 1, message = "Department name is required"))]
    pub name: String,
    pub parent_id: Option<String>,
}

/// Update department request
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `Some(None)` detaches the department from its parent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<String>>,
}

/// Read-only view of the department hierarchy
pub struct DepartmentTree<'a> {
    by_id: HashMap<&'a str, &'a Department>,
}

impl<'a> DepartmentTree<'a> {
    pub fn new(departments: &'a [Department]) -> Self {
        Self {
            by_id: departments.iter().map(|d| (d.id.as_str(), d)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&'a Department> {
        self.by_id.get(id).copied()
    }

    /// Direct children of a department, sorted by name
    pub fn children(&self, id: &str) -> Vec<&'a Department> {
        let mut children: Vec<_> = self
            .by_id
            .values()
            .filter(|d| d.parent_id.as_deref() == Some(id))
            .copied()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        children
    }

    /// Ancestors from the direct parent up to the root.
    /// Stops at the first repeated id, so a corrupt hierarchy cannot loop.
    pub fn ancestors(&self, id: &str) -> Vec<&'a Department> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut current = self.get(id).and_then(|d| d.parent_id.as_deref());

        while let Some(parent_id) = current {
            if !seen.insert(parent_id) {
                break;
            }
            match self.get(parent_id) {
                Some(parent) => {
                    result.push(parent);
                    current = parent.parent_id.as_deref();
                }
                None => break,
            }
        }
        result
    }

    /// Whether re-parenting `id` under `new_parent` would close a cycle
    pub fn would_create_cycle(&self, id: &str, new_parent: &str) -> bool {
        if id == new_parent {
            return true;
        }
        self.ancestors(new_parent).iter().any(|d| d.id == id)
    }
}
