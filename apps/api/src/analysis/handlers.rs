use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::analysis::{AtsReport, CareerReport, Upload, UploadError};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// POST /api/v1/analysis/ats
pub async fn handle_ats(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<Json<AtsReport>, AppError> {
    let upload = read_upload(multipart).await?;
    info!("ATS analysis requested by user {}", auth.id);
    Ok(Json(state.analyzer.score(&upload).await?))
}

/// POST /api/v1/analysis/career
pub async fn handle_career(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<Json<CareerReport>, AppError> {
    let upload = read_upload(multipart).await?;
    info!("Career analysis requested by user {}", auth.id);
    Ok(Json(state.analyzer.career(&upload).await?))
}

/// Reads the `file` field; other fields are skipped.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;
        return Ok(Upload::new(
            content_type.as_deref(),
            file_name.as_deref(),
            bytes,
        )?);
    }
    Err(UploadError::MissingFile.into())
}
