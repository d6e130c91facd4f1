use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::models::user::Resume;
use crate::resume::service;
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub resume: Resume,
}

/// POST /api/resume/upload
///
/// Multipart body with the file in the `resume` field. Other fields are ignored.
pub async fn handle_upload(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) =
        upload.ok_or_else(|| AppError::Validation("Please upload a file".to_string()))?;

    let resume = service::upload(
        state.store.as_ref(),
        &state.resumes,
        &user,
        &file_name,
        &data,
    )
    .await?;

    Ok(Json(UploadResponse {
        message: "Resume uploaded successfully",
        resume,
    }))
}

/// GET /api/resume
pub async fn handle_get(AuthUser(user): AuthUser) -> Result<Json<Resume>, AppError> {
    user.resume
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
}

/// DELETE /api/resume
pub async fn handle_delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>, AppError> {
    service::delete(state.store.as_ref(), &state.resumes, &user).await?;
    Ok(Json(json!({ "message": "Resume deleted successfully" })))
}
