//! Session endpoints.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{LoginRequest, SessionResponse, SignupRequest, UpdateProfileRequest, User};
use crate::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<SessionResponse> {
    let session = state.auth.login(request).await?;
    state.loaded_pages.reset();
    success(session)
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<SessionResponse> {
    let session = state.auth.signup(request).await?;
    state.loaded_pages.reset();
    success(session)
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> ApiResult<()> {
    state.auth.logout().await?;
    state.loaded_pages.reset();
    success(())
}

/// GET /api/auth/me - The signed-in user, 401 when nobody is.
pub async fn current_user(State(state): State<AppState>) -> ApiResult<User> {
    match state.auth.current().await? {
        Some(user) => success(user),
        None => Err(AppError::Unauthorized("Not signed in".to_string())),
    }
}

/// PUT /api/auth/profile - Merge fields into the signed-in user.
pub async fn update_profile(
    State(state): State<AppState>,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<User> {
    success(state.auth.update_profile(request).await?)
}
