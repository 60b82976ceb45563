//! Equipment item endpoints

use super::ApiClient;
use crate::{
    error::AppResult,
    models::equipment::{CreateEquipment, EquipmentItem, UpdateEquipment},
};

impl ApiClient {
    pub async fn items_list(&self) -> AppResult<Vec<EquipmentItem>> {
        self.get_json(&["items"]).await
    }

    pub async fn items_get(&self, id: &str) -> AppResult<EquipmentItem> {
        self.get_json(&["items", id]).await
    }

    pub async fn items_create(&self, data: &CreateEquipment) -> AppResult<EquipmentItem> {
        self.post_json(&["items"], data).await
    }

    pub async fn items_update(&self, id: &str, data: &UpdateEquipment) -> AppResult<EquipmentItem> {
        self.put_json(&["items", id], data).await
    }

    pub async fn items_delete(&self, id: &str) -> AppResult<()> {
        self.delete(&["items", id]).await
    }
}
