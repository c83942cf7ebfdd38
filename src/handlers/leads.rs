// src/handlers/leads.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        lead::{
            LeadStatus, NewLead, COUNTRIES, DEFAULT_PAYMENT_METHOD, PAYMENT_METHODS, SERVICES,
            SOURCES,
        },
        period::Period,
    },
};

// ---
// Validadores de catálogo
// ---

fn in_catalogue(value: &str, catalogue: &[&str], message: &'static str) -> Result<(), ValidationError> {
    if catalogue.contains(&value) {
        return Ok(());
    }
    let mut err = ValidationError::new("catalogue");
    err.add_param("value".into(), &value);
    err.message = Some(message.into());
    Err(err)
}

fn validate_source(source: &str) -> Result<(), ValidationError> {
    in_catalogue(source, SOURCES, "Fonte desconhecida.")
}

fn validate_service(service: &str) -> Result<(), ValidationError> {
    in_catalogue(service, SERVICES, "Serviço desconhecido.")
}

fn validate_country(country: &str) -> Result<(), ValidationError> {
    in_catalogue(country, COUNTRIES, "País desconhecido.")
}

fn validate_payment_method(method: &str) -> Result<(), ValidationError> {
    in_catalogue(method, PAYMENT_METHODS, "Forma de pagamento desconhecida.")
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

fn default_payment_method() -> String {
    DEFAULT_PAYMENT_METHOD.to_string()
}

// ---
// Payload: usado tanto no POST quanto no PUT (o PUT substitui o registro inteiro)
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeadPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub date: NaiveDate,

    #[validate(custom(function = "validate_source"))]
    pub source: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub value: Decimal,

    #[serde(default)] // Sem status, o lead entra em "Contacto"
    pub status: LeadStatus,

    #[validate(custom(function = "validate_service"))]
    pub service: String,

    #[validate(custom(function = "validate_country"))]
    pub country: String,

    #[validate(custom(function = "validate_payment_method"))]
    #[serde(default = "default_payment_method")]
    pub payment_method: String,

    pub notes: Option<String>,
}

impl From<LeadPayload> for NewLead {
    fn from(payload: LeadPayload) -> Self {
        NewLead {
            name: payload.name.trim().to_string(),
            date: payload.date,
            source: payload.source,
            value: payload.value,
            status: payload.status,
            service: payload.service,
            country: payload.country,
            payment_method: payload.payment_method,
            notes: payload.notes.filter(|notes| !notes.trim().is_empty()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    #[serde(default)]
    pub period: Period,
}

// POST /api/leads
pub async fn create_lead(
    State(app_state): State<AppState>,
    Json(payload): Json<LeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = app_state.board_service.create_lead(&payload.into()).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

// GET /api/leads?period=current_month
pub async fn list_leads(
    State(app_state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let now = app_state.clock.now();
    let leads = app_state
        .lead_service
        .list_for_period(query.period, now)
        .await?;
    Ok(Json(leads))
}

// PUT /api/leads/{id}
pub async fn update_lead(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = NewLead::from(payload).with_id(id);
    let updated = app_state.board_service.update_lead(&lead).await?;
    Ok(Json(updated))
}

// DELETE /api/leads/{id}
pub async fn delete_lead(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.board_service.delete_lead(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
