//! App version endpoint

use super::ApiClient;
use crate::{error::AppResult, models::app_version::AppVersionInfo};

impl ApiClient {
    pub async fn app_version(&self) -> AppResult<AppVersionInfo> {
        self.get_json(&["app", "version"]).await
    }
}
