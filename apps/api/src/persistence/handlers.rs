//! Raw storage access, bypassing the editing session.

use axum::{extract::State, Json};

use crate::auth::AuthUser;
use crate::builder::model::ResumeState;
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ResumeState>, AppError> {
    let stored = state
        .store
        .get(auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found for this user".into()))?;
    Ok(Json(stored))
}

/// POST /api/v1/resume
/// Upserts the whole state. A live editing session keeps its own copy and will overwrite this
/// on its next save.
pub async fn handle_put_resume(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(resume): Json<ResumeState>,
) -> Result<Json<ResumeState>, AppError> {
    resume
        .data
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let stored = state.store.put(auth.id, &resume).await?;
    Ok(Json(stored))
}
