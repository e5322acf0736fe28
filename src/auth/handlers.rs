//! Authentication endpoints: registration, login, token refresh, profile

use super::{
    jwt::AuthError,
    users::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, UpdateProfileRequest},
    AdminIdentity, Identity,
};
use crate::{database::UserStats, AppState};
use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::info;

/// User registration endpoint
///
/// Registers a new account and returns the profile plus a JWT token pair.
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    info!("User registration attempt: {}", request.email);

    let response = state.user_service.register(request).await?;

    info!("User registered successfully: {}", response.user.email);
    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint
pub async fn login_user(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    info!("User login attempt: {}", request.email);

    let response = state.user_service.login(request).await?;

    info!("User logged in successfully: {}", response.user.email);
    Ok(Json(response))
}

/// Token refresh endpoint
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<Value>, AuthError> {
    let tokens = state.user_service.refresh_token(request).await?;

    info!("Token refreshed successfully");
    Ok(Json(json!(tokens)))
}

/// Current user profile
pub async fn get_current_user(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Value>, AuthError> {
    let user = state.user_service.current_user(&identity).await?;

    Ok(Json(json!({
        "user": user,
        "mode": identity.mode,
    })))
}

/// Partial profile update
pub async fn update_profile(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AuthError> {
    let user = state.user_service.update_profile(&identity, request).await?;

    Ok(Json(json!({ "user": user })))
}

/// User statistics for the admin surface
pub async fn admin_stats(
    State(state): State<AppState>,
    AdminIdentity(identity): AdminIdentity,
) -> Result<Json<UserStats>, AuthError> {
    info!("Admin stats requested by: {}", identity.id);

    let Some(db) = &state.database else {
        return Err(AuthError::StoreUnavailable { detail: None });
    };

    let stats = db.user_stats().await.map_err(|e| AuthError::StoreUnavailable {
        detail: state.config.dev_mode.then(|| e.to_string()),
    })?;

    Ok(Json(stats))
}
