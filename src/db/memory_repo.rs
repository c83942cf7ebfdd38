// src/db/memory_repo.rs

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::lead_repo::LeadRepository,
    models::lead::{Lead, NewLead},
};

/// Repositório em memória (`LEAD_STORE=memory`). Mantém a ordem de inserção,
/// igual ao `ORDER BY created_at` do Postgres.
#[derive(Clone, Default)]
pub struct InMemoryLeadRepository {
    leads: Arc<RwLock<Vec<Lead>>>,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leads(leads: Vec<Lead>) -> Self {
        Self {
            leads: Arc::new(RwLock::new(leads)),
        }
    }
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn create(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let created = lead.clone().with_id(Uuid::new_v4());
        self.leads.write().await.push(created.clone());
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Lead>, AppError> {
        Ok(self.leads.read().await.clone())
    }

    async fn update(&self, lead: &Lead) -> Result<Lead, AppError> {
        let mut leads = self.leads.write().await;
        let slot = leads
            .iter_mut()
            .find(|existing| existing.id == lead.id)
            .ok_or(AppError::LeadNotFound(lead.id))?;
        *slot = lead.clone();
        Ok(lead.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut leads = self.leads.write().await;
        let before = leads.len();
        leads.retain(|lead| lead.id != id);
        if leads.len() == before {
            return Err(AppError::LeadNotFound(id));
        }
        Ok(())
    }
}
