// src/handlers/auth.rs

use axum::{extract::State, Json};
use chrono::Utc;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedSession,
    models::auth::{Credentials, Session},
};

// POST /api/auth/login
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<Json<Session>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let session = app_state.auth_service.login(&payload, Utc::now()).await?;
    Ok(Json(session))
}

// GET /api/auth/session
pub async fn get_session(AuthenticatedSession(session): AuthenticatedSession) -> Json<Session> {
    Json(session)
}
