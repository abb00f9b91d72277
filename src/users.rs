use crate::auth;
use crate::error::ApiError;
use crate::user_models::{CredentialsRequest, LoginResponse, User, UserResponse};
use crate::user_storage::CreateUserError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Duration;
use std::sync::Arc;
use tracing::info;

const MIN_PASSWORD_LEN: usize = 6;

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(payload) = payload?;
    let email = payload.email.trim().to_string();

    if email.is_empty() {
        return Err(ApiError::InvalidRequest("Email cannot be empty".to_string()));
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::InvalidRequest(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }

    let password_hash = auth::hash_password(&payload.password, state.config.bcrypt_cost)
        .map_err(|e| ApiError::Internal(e.into()))?;

    let user = state
        .users
        .create_user(User::new(email, password_hash))
        .await
        .map_err(|e| match e {
            CreateUserError::EmailTaken => ApiError::Conflict(e.to_string()),
            CreateUserError::Storage(source) => ApiError::Internal(source),
        })?;

    info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload?;
    let user = state
        .users
        .get_user_by_email(payload.email.trim())
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = auth::check_password(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.into()))?;

    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let token = auth::make_jwt(
        user.id,
        &state.config.jwt_secret,
        Duration::hours(state.config.jwt_expiry_hours),
    )
    .map_err(|e| ApiError::Internal(e.into()))?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(LoginResponse {
        user: user.into(),
        token,
    }))
}
