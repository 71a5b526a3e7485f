//! Account settings handlers

use std::sync::Arc;

use axum::{extract::State, response::Response, Extension, Json};
use serde::Deserialize;
use tracing::info;

use super::transactions::{decode_image, image_response};
use crate::{AppError, AppState, SessionContext, SuccessResponse};
use xpense_core::{models::User, AccountService};

#[derive(Debug, Deserialize)]
pub struct DisplayNameRequest {
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UsernameRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct EmergencyRateRequest {
    pub rate: u8,
}

#[derive(Debug, Deserialize)]
pub struct ImageUpload {
    /// Base64 PNG or JPEG, optionally as a data: URL
    pub image: String,
}

/// PUT /api/account/display-name
pub async fn update_display_name(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<DisplayNameRequest>,
) -> Result<Json<User>, AppError> {
    let user = AccountService::new(&state.db).set_display_name(&session.username, &req.display_name)?;

    state
        .db
        .log_audit(&session.username, "update_display_name", Some("user"), None, None)?;

    Ok(Json(user))
}

/// PUT /api/account/username - Rename; live sessions follow the new name
pub async fn update_username(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<UsernameRequest>,
) -> Result<Json<User>, AppError> {
    let user = AccountService::new(&state.db).rename(&session.username, &req.username)?;

    if user.username != session.username {
        state
            .sessions
            .rename_user(&session.username, &user.username)
            .await;
        state.db.log_audit(
            &user.username,
            "rename",
            Some("user"),
            None,
            Some(&format!("from={}", session.username)),
        )?;
    }

    Ok(Json(user))
}

/// PUT /api/account/password
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<PasswordRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    if req.new_password != req.confirm_password {
        return Err(AppError::bad_request("Passwords do not match"));
    }

    AccountService::new(&state.db).change_password(
        &session.username,
        &req.current_password,
        &req.new_password,
    )?;

    state
        .db
        .log_audit(&session.username, "change_password", Some("user"), None, None)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// PUT /api/account/emergency-rate - Percentage of future incomes set aside (5-10)
pub async fn update_emergency_rate(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<EmergencyRateRequest>,
) -> Result<Json<User>, AppError> {
    let user = AccountService::new(&state.db).set_emergency_rate(&session.username, req.rate)?;

    state.db.log_audit(
        &session.username,
        "update_emergency_rate",
        Some("user"),
        None,
        Some(&format!("rate={}", req.rate)),
    )?;

    Ok(Json(user))
}

/// GET /api/account/photo - Profile picture bytes
pub async fn get_profile_picture(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Response, AppError> {
    let image = AccountService::new(&state.db)
        .profile_picture(&session.username)?
        .ok_or_else(|| AppError::not_found("No profile picture"))?;
    Ok(image_response(image, None))
}

/// PUT /api/account/photo
pub async fn update_profile_picture(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<ImageUpload>,
) -> Result<Json<User>, AppError> {
    let image = decode_image(&req.image)?;
    let user = AccountService::new(&state.db).set_profile_picture(&session.username, &image)?;

    state.db.log_audit(
        &session.username,
        "update_profile_picture",
        Some("user"),
        None,
        Some(&format!("bytes={}", image.len())),
    )?;

    Ok(Json(user))
}

/// DELETE /api/account/photo
pub async fn delete_profile_picture(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<User>, AppError> {
    let user = AccountService::new(&state.db).remove_profile_picture(&session.username)?;

    state.db.log_audit(
        &session.username,
        "remove_profile_picture",
        Some("user"),
        None,
        None,
    )?;

    Ok(Json(user))
}

/// DELETE /api/account - Delete the account, its transactions and every session
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<SuccessResponse>, AppError> {
    // Removes the audit trail too, so nothing is logged under the freed name
    AccountService::new(&state.db).delete_account(&session.username)?;
    let ended = state.sessions.end_user_sessions(&session.username).await;
    info!(username = %session.username, sessions_ended = ended, "Account deleted");

    Ok(Json(SuccessResponse { success: true }))
}
