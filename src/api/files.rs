//! File upload endpoint

use reqwest::{
    multipart::{Form, Part},
    Method,
};

use super::ApiClient;
use crate::{
    error::{AppError, AppResult},
    models::borrow::{PhotoUpload, UploadResponse},
};

impl ApiClient {
    /// POST files/upload as multipart field `file`, returning the stored URL
    pub async fn files_upload(&self, photo: &PhotoUpload) -> AppResult<String> {
        if photo.bytes.is_empty() {
            return Err(AppError::Validation("Photo is empty".to_string()));
        }

        let part = Part::bytes(photo.bytes.clone())
            .file_name(photo.file_name.clone())
            .mime_str(&photo.mime_type)
            .map_err(|e| AppError::Validation(format!("Invalid photo type {}: {}", photo.mime_type, e)))?;
        let form = Form::new().part("file", part);

        let builder = self.request(Method::POST, &["files", "upload"]).await?.multipart(form);
        let uploaded: UploadResponse = self.execute_json(builder).await?;
        tracing::debug!("Uploaded {} ({} bytes) to {}", photo.file_name, photo.bytes.len(), uploaded.url);
        Ok(uploaded.url)
    }
}
