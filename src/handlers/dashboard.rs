// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{common::error::AppError, config::AppState, handlers::leads::PeriodQuery};

// GET /api/dashboard/summary?period=...
pub async fn get_summary(
    State(app_state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let now = app_state.clock.now();
    let summary = app_state
        .dashboard_service
        .get_summary(query.period, now)
        .await?;
    Ok(Json(summary))
}

// GET /api/dashboard/charts?period=...
pub async fn get_charts(
    State(app_state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let now = app_state.clock.now();
    let charts = app_state
        .dashboard_service
        .get_charts(query.period, now)
        .await?;
    Ok(Json(charts))
}
