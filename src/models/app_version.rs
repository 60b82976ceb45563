//! Application version information published by the server

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppVersionInfo {
    /// Monotonic build number
    pub version_code: i64,
    pub version_name: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub force_update: bool,
    #[serde(default)]
    pub release_notes: Option<String>,
}
