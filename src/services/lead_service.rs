// src/services/lead_service.rs

use std::sync::Arc;

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LeadRepository,
    models::{
        lead::{Lead, NewLead},
        period::Period,
    },
    services::period_filter::filter_leads,
};

#[derive(Clone)]
pub struct LeadService {
    repo: Arc<dyn LeadRepository>,
}

impl LeadService {
    pub fn new(repo: Arc<dyn LeadRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let created = self.repo.create(lead).await.inspect_err(|e| {
            tracing::error!("🔥 Erro ao inserir lead '{}': {}", lead.name, e);
        })?;
        tracing::info!(lead_id = %created.id, "🆕 Lead criado: {}", created.name);
        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<Lead>, AppError> {
        self.repo.list().await.inspect_err(|e| {
            tracing::error!("🔥 Erro ao buscar leads: {}", e);
        })
    }

    pub async fn list_for_period(
        &self,
        period: Period,
        now: NaiveDateTime,
    ) -> Result<Vec<Lead>, AppError> {
        let leads = self.list().await?;
        Ok(filter_leads(&leads, period, now))
    }

    pub async fn update(&self, lead: &Lead) -> Result<Lead, AppError> {
        let updated = self.repo.update(lead).await.inspect_err(|e| {
            tracing::error!(lead_id = %lead.id, "🔥 Erro ao atualizar lead: {}", e);
        })?;
        tracing::info!(lead_id = %updated.id, status = %updated.status, "✏️ Lead atualizado");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete(id).await.inspect_err(|e| {
            tracing::error!(lead_id = %id, "🔥 Erro ao excluir lead: {}", e);
        })?;
        tracing::info!(lead_id = %id, "🗑️ Lead excluído");
        Ok(())
    }
}
