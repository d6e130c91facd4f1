//! Axum route handlers for registration, login and the caller's profile.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::jobs::matching::normalize_skills;
use crate::models::user::{normalize_email, NewUser, User};
use crate::state::AppState;
use crate::validation::{not_blank, trimmed_non_empty};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(email(message = "Valid email is required"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<String>,
}

/// The user plus a bearer token for subsequent requests.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    req.validate()?;

    let email = normalize_email(&req.email);
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password_hash = state.passwords.hash(&req.password).await?;
    let user = state
        .store
        .create_user(NewUser {
            name: req.name.trim().to_string(),
            email,
            password_hash,
        })
        .await?;
    info!("Registered user {}", user.id);

    let token = state.tokens.issue(user.id)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password produce the same error.
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()?;

    let user = state
        .store
        .find_user_by_email(&normalize_email(&req.email))
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash).await? {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id)?;
    Ok(Json(AuthResponse { user, token }))
}

/// GET /api/auth/profile
pub async fn handle_get_profile(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

/// PUT /api/auth/profile
///
/// Absent fields are left unchanged. Returns a fresh token.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    AuthUser(mut user): AuthUser,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()?;

    if let Some(name) = req.name {
        user.name = name.trim().to_string();
    }
    if let Some(email) = req.email {
        user.email = normalize_email(&email);
    }
    if let Some(skills) = req.skills {
        user.skills = normalize_skills(skills);
    }
    if req.experience.is_some() {
        user.experience = trimmed_non_empty(req.experience);
    }
    if let Some(password) = req.password {
        user.password_hash = state.passwords.hash(&password).await?;
    }

    let user = state.store.update_user(&user).await?;
    let token = state.tokens.issue(user.id)?;
    Ok(Json(AuthResponse { user, token }))
}
