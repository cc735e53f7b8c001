//! Axum route handlers for the prediction API.

use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::extraction::Document;
use crate::inference::service::PredictionResult;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// POST /predict
///
/// Multipart upload with a `file` field. Returns the top roles as
/// `{"roles": [["name", probability], ...]}`.
pub async fn handle_predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PredictionResult>, AppError> {
    let document = read_upload(&mut multipart).await?;
    let filename = document.filename().to_string();
    let size = document.content().len();

    let service = state.model.clone();
    let started = Instant::now();
    let task = tokio::task::spawn_blocking(move || service.predict(&document));
    let result = tokio::time::timeout(state.config.request_timeout, task)
        .await
        .map_err(|_| AppError::Timeout(state.config.request_timeout.as_secs()))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("prediction task failed: {e}")))??;

    info!(
        "Predicted {} for '{}' ({} bytes) in {:?}",
        result
            .roles
            .first()
            .map_or("<none>", |r| r.role.as_str()),
        filename,
        size,
        started.elapsed()
    );
    Ok(Json(result))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Document, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::EmptyInput("No file uploaded.".to_string()))?;
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        if content.is_empty() {
            return Err(AppError::EmptyInput("Uploaded file is empty.".to_string()));
        }
        return Ok(Document::new(filename, content));
    }
    Err(AppError::EmptyInput("No file uploaded.".to_string()))
}
