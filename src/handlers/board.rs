// src/handlers/board.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{lead::LeadStatus, period::Period},
};

#[derive(Debug, Default, Deserialize)]
pub struct SyncPayload {
    #[serde(default)]
    pub period: Period,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPayload {
    pub status: LeadStatus,
    pub from_index: usize,
    pub to_index: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePayload {
    pub lead_id: Uuid,
    pub new_status: LeadStatus,
    pub position: Option<usize>,
}

// =============================================================================
//  QUADRO
// =============================================================================

// GET /api/board
pub async fn get_board(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.board_service.snapshot().await)
}

// POST /api/board/sync
pub async fn sync_board(
    State(app_state): State<AppState>,
    Json(payload): Json<SyncPayload>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = app_state.board_service.sync(payload.period).await?;
    Ok(Json(snapshot))
}

// POST /api/board/reorder
pub async fn reorder(
    State(app_state): State<AppState>,
    Json(payload): Json<ReorderPayload>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = app_state
        .board_service
        .reorder(payload.status, payload.from_index, payload.to_index)
        .await?;
    Ok(Json(snapshot))
}

// POST /api/board/move
pub async fn move_lead(
    State(app_state): State<AppState>,
    Json(payload): Json<MovePayload>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = app_state
        .board_service
        .move_lead(payload.lead_id, payload.new_status, payload.position)
        .await?;
    Ok(Json(receipt))
}

// =============================================================================
//  CONFIRMAÇÕES
// =============================================================================

// GET /api/board/mutations
pub async fn list_mutations(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.board_service.mutations().await)
}

// GET /api/board/mutations/{id}
pub async fn get_mutation(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.board_service.mutation(id).await?))
}

// POST /api/board/mutations/{id}/retry
pub async fn retry_mutation(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.board_service.retry(id).await?))
}

// POST /api/board/mutations/{id}/rollback
pub async fn rollback_mutation(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.board_service.rollback(id).await?))
}
