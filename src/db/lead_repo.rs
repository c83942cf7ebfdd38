// src/db/lead_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{Lead, LeadRow, NewLead},
};

/// As quatro operações que o resto do sistema usa para persistir leads.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn create(&self, lead: &NewLead) -> Result<Lead, AppError>;
    async fn list(&self) -> Result<Vec<Lead>, AppError>;
    async fn update(&self, lead: &Lead) -> Result<Lead, AppError>;
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

const INSERT_LEAD: &str = r#"
    INSERT INTO leads (
        name, date, source, value, status, service, country, payment_method, notes
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    RETURNING id, name, date, source, value, status, service, country, payment_method, notes
"#;

const SELECT_LEADS: &str = r#"
    SELECT id, name, date, source, value, status, service, country, payment_method, notes
    FROM leads
    ORDER BY created_at ASC
"#;

const UPDATE_LEAD: &str = r#"
    UPDATE leads
    SET name = $2, date = $3, source = $4, value = $5, status = $6,
        service = $7, country = $8, payment_method = $9, notes = $10,
        updated_at = NOW()
    WHERE id = $1
    RETURNING id, name, date, source, value, status, service, country, payment_method, notes
"#;

const DELETE_LEAD: &str = "DELETE FROM leads WHERE id = $1";

// Converte violação de CHECK/NOT NULL em um erro de negócio
fn map_write_error(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_check_violation() || db_err.is_unique_violation() {
            return AppError::ConstraintViolation(db_err.message().to_string());
        }
    }
    AppError::DatabaseError(e)
}

// O repositório de leads, responsável por todas as interações com a tabela 'leads'
#[derive(Clone)]
pub struct PgLeadRepository {
    pool: PgPool,
}

impl PgLeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadRepository for PgLeadRepository {
    async fn create(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let row = sqlx::query_as::<_, LeadRow>(INSERT_LEAD)
            .bind(&lead.name)
            .bind(lead.date)
            .bind(&lead.source)
            .bind(lead.value)
            .bind(lead.status.label())
            .bind(&lead.service)
            .bind(&lead.country)
            .bind(&lead.payment_method)
            .bind(&lead.notes)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(AppError::EmptyResponse)?;

        Ok(Lead::try_from(row)?)
    }

    async fn list(&self) -> Result<Vec<Lead>, AppError> {
        let rows = sqlx::query_as::<_, LeadRow>(SELECT_LEADS)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| Lead::try_from(row).map_err(AppError::from))
            .collect()
    }

    async fn update(&self, lead: &Lead) -> Result<Lead, AppError> {
        let row = sqlx::query_as::<_, LeadRow>(UPDATE_LEAD)
            .bind(lead.id)
            .bind(&lead.name)
            .bind(lead.date)
            .bind(&lead.source)
            .bind(lead.value)
            .bind(lead.status.label())
            .bind(&lead.service)
            .bind(&lead.country)
            .bind(&lead.payment_method)
            .bind(&lead.notes)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(AppError::LeadNotFound(lead.id))?;

        Ok(Lead::try_from(row)?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(DELETE_LEAD)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::LeadNotFound(id));
        }
        Ok(())
    }
}
