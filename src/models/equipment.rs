//! Equipment model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Availability derived from quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    Available,
    PartiallyBorrowed,
    Unavailable,
}

/// Equipment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentItem {
    pub id: String,
    /// Equipment name / description
    pub name: String,
    pub category_id: String,
    pub department_id: String,
    /// Number of units owned
    pub quantity: i64,
    /// Units currently on the shelf; expected to stay <= quantity
    pub available_quantity: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl EquipmentItem {
    pub fn status(&self) -> EquipmentStatus {
        if self.available_quantity <= 0 {
            EquipmentStatus::Unavailable
        } else if self.available_quantity >= self.quantity {
            EquipmentStatus::Available
        } else {
            EquipmentStatus::PartiallyBorrowed
        }
    }

    /// Units currently out on loan
    pub fn borrowed_quantity(&self) -> i64 {
        (self.quantity - self.available_quantity).max(0)
    }

    pub fn can_borrow(&self, quantity: i64) -> bool {
        quantity >= 1 && quantity <= self.available_quantity
    }
}

/// Create equipment request
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipment {
    #[validate(length(min = 1, message = "Equipment name is required"))]
    pub name: String,
    pub category_id: String,
    pub department_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Update equipment request
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEquipment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, available: i64) -> EquipmentItem {
        EquipmentItem {
            id: "i1".into(),
            name: "Projector".into(),
            category_id: "c1".into(),
            department_id: "d1".into(),
            quantity,
            available_quantity: available,
            description: None,
            image_url: None,
        }
    }

    #[test]
    fn test_derived_status() {
        assert_eq!(item(3, 3).status(), EquipmentStatus::Available);
        assert_eq!(item(3, 1).status(), EquipmentStatus::PartiallyBorrowed);
        assert_eq!(item(3, 0).status(), EquipmentStatus::Unavailable);
        assert_eq!(item(0, 0).status(), EquipmentStatus::Unavailable);
    }

    #[test]
    fn test_can_borrow() {
        let projector = item(4, 2);
        assert!(projector.can_borrow(1));
        assert!(projector.can_borrow(2));
        assert!(!projector.can_borrow(3));
        assert!(!projector.can_borrow(0));
        assert_eq!(projector.borrowed_quantity(), 2);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{"id":"7","name":"Camera","categoryId":"c","departmentId":"d","quantity":2,"availableQuantity":1}"#;
        let parsed: EquipmentItem = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.available_quantity, 1);
        assert_eq!(parsed.description, None);
    }
}
