use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::{auth::AuthClaims, errors::AppError, forms::FileInput, state::AppState};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Stores the first file part of a multipart body and returns its public URL.
pub async fn upload_handler(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Malformed multipart body: {}", e);
        AppError::BadRequest(e.to_string()).to_response()
    })? {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            tracing::error!("Failed to read upload {}: {}", name, e);
            AppError::BadRequest(e.to_string()).to_response()
        })?;

        let file = FileInput {
            name,
            content_type,
            bytes: bytes.to_vec(),
        };
        let url = state.uploader.upload(&file).await.map_err(|e| {
            tracing::error!("Upload of {} failed: {}", file.name, e);
            e.to_response()
        })?;

        tracing::info!("{} uploaded {}", claims.sub, file.name);
        return Ok(Json(UploadResponse { url }));
    }

    Err(AppError::BadRequest("No file in upload".into()).to_response())
}
