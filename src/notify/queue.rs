// src/notify/queue.rs

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::models::lead::Lead;
use crate::notify::webhook::NotificationSink;

/// Fila de saída das notificações.
///
/// Um único worker consome a fila e chama o `NotificationSink`. Cada entrega
/// é tentada uma vez só: falhas são logadas e descartadas, sem retry, e nunca
/// voltam para quem enfileirou.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    tx: mpsc::UnboundedSender<Lead>,
}

impl NotificationQueue {
    /// Sobe o worker. Precisa ser chamado dentro de um runtime tokio.
    pub fn spawn(sink: Arc<dyn NotificationSink>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Lead>();

        tokio::spawn(async move {
            while let Some(lead) = rx.recv().await {
                match sink.deliver(&lead).await {
                    Ok(()) => {
                        tracing::info!(lead_id = %lead.id, status = %lead.status, "📨 Webhook enviado com sucesso");
                    }
                    Err(e) => {
                        tracing::warn!(lead_id = %lead.id, error = %e, "Falha ao enviar webhook (sem nova tentativa)");
                    }
                }
            }
            tracing::debug!("Fila de notificações encerrada");
        });

        Self { tx }
    }

    /// Retorna `false` se o worker já morreu.
    pub fn enqueue(&self, lead: Lead) -> bool {
        match self.tx.send(lead) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(lead_id = %err.0.id, "🔥 Fila de notificações fechada; webhook não enviado");
                false
            }
        }
    }
}
