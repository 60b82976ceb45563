//! App update check

use crate::{api::ApiClient, error::AppResult, models::app_version::AppVersionInfo};

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateStatus {
    UpToDate,
    UpdateAvailable(AppVersionInfo),
    /// The server refuses older builds
    UpdateRequired(AppVersionInfo),
}

#[derive(Clone)]
pub struct VersionService {
    api: ApiClient,
}

impl VersionService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn check_for_update(&self, current_code: i64) -> AppResult<UpdateStatus> {
        let latest = self.api.app_version().await?;
        let status = classify(current_code, latest);
        match &status {
            UpdateStatus::UpToDate => tracing::debug!("Build {} is up to date", current_code),
            UpdateStatus::UpdateAvailable(info) | UpdateStatus::UpdateRequired(info) => tracing::info!(
                "Build {} available (running {}, forced: {})",
                info.version_name,
                current_code,
                info.force_update
            ),
        }
        Ok(status)
    }
}

fn classify(current_code: i64, latest: AppVersionInfo) -> UpdateStatus {
    if latest.version_code <= current_code {
        UpdateStatus::UpToDate
    } else if latest.force_update {
        UpdateStatus::UpdateRequired(latest)
    } else {
        UpdateStatus::UpdateAvailable(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::client_for;
    use axum::{routing::get, Json, Router};
    use serde_json::json;

    fn info(code: i64, forced: bool) -> AppVersionInfo {
        AppVersionInfo {
            version_code: code,
            version_name: format!("1.{}", code),
            download_url: None,
            force_update: forced,
            release_notes: None,
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(5, info(5, true)), UpdateStatus::UpToDate);
        assert_eq!(classify(6, info(5, false)), UpdateStatus::UpToDate);
        assert_eq!(classify(4, info(5, false)), UpdateStatus::UpdateAvailable(info(5, false)));
        assert_eq!(classify(4, info(5, true)), UpdateStatus::UpdateRequired(info(5, true)));
    }

    #[tokio::test]
    async fn test_check_for_update_without_session() {
        let router = Router::new().route(
            "/app/version",
            get(|| async { Json(json!({"versionCode": 3, "versionName": "1.3", "forceUpdate": false})) }),
        );
        let service = VersionService::new(client_for(router).await);

        match service.check_for_update(1).await.unwrap() {
            UpdateStatus::UpdateAvailable(info) => assert_eq!(info.version_name, "1.3"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
