// src/notify/webhook.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::models::lead::Lead;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Falha de rede ao chamar o webhook: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Webhook respondeu com status {0}")]
    Rejected(StatusCode),
}

/// Destino das notificações de mudança de coluna.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, lead: &Lead) -> Result<(), NotifyError>;
}

/// POST com o lead completo em JSON para uma URL fixa.
/// Nenhum corpo de resposta é lido; só o status importa.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    async fn deliver(&self, lead: &Lead) -> Result<(), NotifyError> {
        let response = self.client.post(&self.url).json(lead).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status));
        }
        Ok(())
    }
}

/// Usado quando `WEBHOOK_URL` não está configurada.
#[derive(Debug, Clone, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl NotificationSink for DisabledNotifier {
    async fn deliver(&self, lead: &Lead) -> Result<(), NotifyError> {
        tracing::debug!(lead_id = %lead.id, "Webhook não configurado; notificação descartada");
        Ok(())
    }
}
