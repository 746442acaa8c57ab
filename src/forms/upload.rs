use async_trait::async_trait;
use std::path::PathBuf;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInput {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// External upload collaborator: stores a file and returns its public URL.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: &FileInput) -> Result<String, AppError>;
}

/// Writes uploads to a local directory served under `public_path`.
pub struct LocalUploader {
    dir: PathBuf,
    public_path: String,
    max_bytes: usize,
}

impl LocalUploader {
    pub fn new(dir: impl Into<PathBuf>, public_path: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            public_path: public_path.into().trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

/// Keeps ASCII alphanumerics, `.`, `-` and `_`; anything else becomes `_`.
pub fn stored_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[async_trait]
impl Uploader for LocalUploader {
    async fn upload(&self, file: &FileInput) -> Result<String, AppError> {
        if file.bytes.is_empty() {
            return Err(AppError::BadRequest(format!("{} is empty", file.name)));
        }
        if file.bytes.len() > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "{} exceeds the {} byte upload limit",
                file.name, self.max_bytes
            )));
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        let stored = format!("{}-{}", Uuid::new_v4(), stored_file_name(&file.name));
        tokio::fs::write(self.dir.join(&stored), &file.bytes)
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        tracing::info!("Stored upload {} ({} bytes)", stored, file.bytes.len());
        Ok(format!("{}/{}", self.public_path, stored))
    }
}
