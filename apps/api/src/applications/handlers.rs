use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::applications::lifecycle::{self, ApplyRequest, StatusUpdateRequest};
use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::application::{Application, ApplicationDetail, ApplicationWithJob};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApplicationList {
    pub count: usize,
    pub applications: Vec<ApplicationWithJob>,
}

/// POST /api/applications
pub async fn handle_apply(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(req): AppJson<ApplyRequest>,
) -> Result<(StatusCode, Json<ApplicationWithJob>), AppError> {
    let created = lifecycle::apply(state.store.as_ref(), &user, req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/applications
pub async fn handle_list_mine(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApplicationList>, AppError> {
    let applications = lifecycle::list_mine(state.store.as_ref(), &user).await?;
    Ok(Json(ApplicationList {
        count: applications.len(),
        applications,
    }))
}

/// GET /api/applications/:id
pub async fn handle_get(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApplicationDetail>, AppError> {
    Ok(Json(lifecycle::get_detail(state.store.as_ref(), &user, id).await?))
}

/// PUT /api/applications/:id
pub async fn handle_update_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<StatusUpdateRequest>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(
        lifecycle::update_status(state.store.as_ref(), &user, id, req).await?,
    ))
}

/// DELETE /api/applications/:id
pub async fn handle_withdraw(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    lifecycle::withdraw(state.store.as_ref(), &user, id).await?;
    Ok(Json(json!({ "message": "Application removed" })))
}
