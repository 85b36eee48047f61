use std::path::{Component, Path, PathBuf};

use axum::extract::Multipart;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
};

pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFolder {
    Products,
    Payments,
}

impl UploadFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadFolder::Products => "products",
            UploadFolder::Payments => "payments",
        }
    }
}

/// File extension for an accepted image content type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// True for a path that stays inside the upload directory.
pub fn is_safe_relative(path: &str) -> bool {
    let path = Path::new(path);
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

/// Read the `file` field of a multipart body, validate it and write it under
/// `UPLOAD_DIR/<folder>/`. Returns the path relative to the upload directory.
pub async fn store_image(
    config: &AppConfig,
    folder: UploadFolder,
    multipart: &mut Multipart,
) -> AppResult<String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let extension = extension_for(&content_type).ok_or_else(|| {
            AppError::BadRequest("Only JPEG, PNG or WebP images are accepted".into())
        })?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".into()));
        }
        if bytes.len() > config.max_upload_bytes {
            return Err(AppError::BadRequest(format!(
                "File exceeds the {} byte limit",
                config.max_upload_bytes
            )));
        }

        let relative = format!("{}/{}.{}", folder.as_str(), Uuid::new_v4(), extension);
        let target = config.upload_dir.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(e.into()))?;
        }
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|e| AppError::Internal(e.into()))?;

        tracing::debug!(path = %relative, size = bytes.len(), "upload stored");
        return Ok(relative);
    }

    Err(AppError::BadRequest(format!(
        "Missing '{FILE_FIELD}' field in multipart body"
    )))
}

/// Best-effort removal of a previously stored upload. Failures are logged, never returned.
pub async fn remove_upload(config: &AppConfig, relative: &str) {
    if !is_safe_relative(relative) {
        tracing::warn!(path = %relative, "refusing to remove upload outside upload dir");
        return;
    }
    let target: PathBuf = config.upload_dir.join(relative);
    if let Err(err) = tokio::fs::remove_file(&target).await {
        tracing::warn!(error = %err, path = %target.display(), "failed to remove upload");
    }
}
