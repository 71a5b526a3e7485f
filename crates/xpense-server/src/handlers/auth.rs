//! Authentication-related handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState, SessionContext, SuccessResponse};
use xpense_core::{models::User, AccountService};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    /// Bearer token for the Authorization header
    pub token: String,
    pub user: User,
}

/// POST /api/auth/register - Create an account
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<User>, AppError> {
    let user = AccountService::new(&state.db).register(
        &req.username,
        &req.password,
        &req.confirm_password,
    )?;

    state
        .db
        .log_audit(&user.username, "register", Some("user"), None, None)?;

    Ok(Json(user))
}

/// POST /api/auth/login - Exchange credentials for a session token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = AccountService::new(&state.db).authenticate(req.username.trim(), &req.password)?;
    let token = state.sessions.create_session(&user.username).await;

    state
        .db
        .log_audit(&user.username, "login", Some("session"), None, None)?;

    Ok(Json(LoginResponse { token, user }))
}

/// POST /api/auth/logout - End the current session
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.end_session(&session.token).await;

    state
        .db
        .log_audit(&session.username, "logout", Some("session"), None, None)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/me - The logged-in user's profile
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<User>, AppError> {
    let user = AccountService::new(&state.db).profile(&session.username)?;
    Ok(Json(user))
}
