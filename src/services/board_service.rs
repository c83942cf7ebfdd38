// src/services/board_service.rs

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::{
    board::{
        BoardColumn, BoardEffect, BoardState, ConfirmationState, Mutation,
        MutationError, MutationLog,
    },
    common::error::AppError,
    models::{
        lead::{Lead, LeadStatus, NewLead},
        period::Period,
    },
    notify::{NotificationPolicy, NotificationQueue},
    services::{clock::Clock, lead_service::LeadService, period_filter::filter_leads},
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub period: Period,
    pub columns: Vec<BoardColumn>,
    pub pending_mutations: usize,
    pub failed_mutations: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveReceipt {
    pub lead: Lead,
    pub previous_status: LeadStatus,
    /// Presente quando o movimento gerou uma gravação no banco.
    pub mutation_id: Option<Uuid>,
    pub notification_queued: bool,
}

// Tudo que o Kanban precisa, protegido por um único mutex.
struct BoardSession {
    upstream: Vec<Lead>, // Lista completa, sem filtro de período
    period: Period,
    board: BoardState,
    mutations: MutationLog,
}

impl BoardSession {
    /// Refaz o quadro a partir da lista completa. Reordenações locais se
    /// perdem; movimentos ainda não confirmados (pendentes ou com falha) são
    /// reaplicados por cima, na ordem em que aconteceram.
    fn rederive(&mut self, now: NaiveDateTime) {
        let filtered = filter_leads(&self.upstream, self.period, now);
        self.board.replace_leads(filtered);

        for unsettled in self.mutations.unsettled() {
            if let Err(e) = self.board.set_status(unsettled.lead.id, unsettled.lead.status) {
                tracing::debug!(mutation_id = %unsettled.id, "Lead fora do período ao reaplicar: {}", e);
            }
        }
    }

    fn upsert_upstream(&mut self, lead: Lead) {
        match self.upstream.iter_mut().find(|existing| existing.id == lead.id) {
            Some(existing) => *existing = lead,
            None => self.upstream.push(lead),
        }
    }

    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            period: self.period,
            columns: self.board.columns(),
            pending_mutations: self.mutations.pending().count(),
            failed_mutations: self.mutations.count_failed(),
        }
    }
}

struct PersistJob {
    mutation_id: Uuid,
    lead: Lead,
}

/// Worker único de gravação: os movimentos chegam ao banco na ordem em que
/// foram feitos.
struct Persister {
    leads: LeadService,
    session: Arc<Mutex<BoardSession>>,
    write_gate: Arc<Mutex<()>>,
    clock: Clock,
}

impl Persister {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<PersistJob>) {
        while let Some(job) = rx.recv().await {
            self.persist(job).await;
        }
        tracing::debug!("Fila de gravação encerrada");
    }

    async fn persist(&self, job: PersistJob) {
        let PersistJob { mutation_id, lead } = job;
        let lead_id = lead.id;
        let _gate = self.write_gate.lock().await;

        // Parte do registro mais recente para não desfazer uma edição de
        // formulário; do movimento só vem o status.
        let record = {
            let session = self.session.lock().await;
            match session.upstream.iter().find(|existing| existing.id == lead_id) {
                Some(current) => current.with_status(lead.status),
                None => lead,
            }
        };

        let result = self.leads.update(&record).await;
        let now = self.clock.now();
        let mut session = self.session.lock().await;

        match result {
            Ok(saved) => {
                if let Err(e) = session.mutations.confirm(mutation_id, saved.clone()) {
                    tracing::warn!(%mutation_id, "Confirmação ignorada: {}", e);
                    return;
                }
                session.upsert_upstream(saved);
                session.rederive(now);
            }
            Err(e) => {
                tracing::error!(%mutation_id, lead_id = %record.id, "🔥 Falha ao gravar movimento: {}", e);
                if let Err(log_err) = session.mutations.fail(mutation_id, e.to_string()) {
                    tracing::warn!(%mutation_id, "Falha não registrada: {}", log_err);
                }
            }
        }
    }
}

/// Dono do estado do Kanban: aplica os movimentos na cópia local na hora e
/// executa os efeitos (gravação e webhook) em segundo plano.
#[derive(Clone)]
pub struct BoardService {
    leads: LeadService,
    notifications: NotificationQueue,
    session: Arc<Mutex<BoardSession>>,
    // Serializa gravações de movimento e edições de formulário.
    write_gate: Arc<Mutex<()>>,
    persist_tx: mpsc::UnboundedSender<PersistJob>,
    clock: Clock,
}

impl BoardService {
    /// Sobe o worker de gravação. Precisa ser chamado dentro de um runtime tokio.
    pub fn new(
        leads: LeadService,
        policy: NotificationPolicy,
        notifications: NotificationQueue,
        clock: Clock,
    ) -> Self {
        let session = Arc::new(Mutex::new(BoardSession {
            upstream: Vec::new(),
            period: Period::default(),
            board: BoardState::new(Vec::new(), policy),
            mutations: MutationLog::default(),
        }));
        let write_gate = Arc::new(Mutex::new(()));

        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        let persister = Persister {
            leads: leads.clone(),
            session: session.clone(),
            write_gate: write_gate.clone(),
            clock: clock.clone(),
        };
        tokio::spawn(persister.run(persist_rx));

        Self {
            leads,
            notifications,
            session,
            write_gate,
            persist_tx,
            clock,
        }
    }

    pub async fn snapshot(&self) -> BoardSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Recarrega a lista do banco e substitui o quadro inteiro.
    pub async fn sync(&self, period: Period) -> Result<BoardSnapshot, AppError> {
        let upstream = self.leads.list().await?;
        let now = self.clock.now();

        let mut session = self.session.lock().await;
        session.upstream = upstream;
        session.period = period;
        session.rederive(now);

        tracing::info!(
            period = ?period,
            leads = session.board.len(),
            "🔄 Quadro sincronizado"
        );
        Ok(session.snapshot())
    }

    // =========================================================================
    //  CALLBACKS DO CONTROLADOR (formulários de criar/editar/excluir)
    // =========================================================================

    pub async fn create_lead(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let created = self.leads.create(lead).await?;
        let now = self.clock.now();

        let mut session = self.session.lock().await;
        session.upsert_upstream(created.clone());
        session.rederive(now);
        Ok(created)
    }

    pub async fn update_lead(&self, lead: &Lead) -> Result<Lead, AppError> {
        let _gate = self.write_gate.lock().await;
        let updated = self.leads.update(lead).await?;
        let now = self.clock.now();

        let mut session = self.session.lock().await;
        session.upsert_upstream(updated.clone());
        session.rederive(now);
        Ok(updated)
    }

    pub async fn delete_lead(&self, id: Uuid) -> Result<(), AppError> {
        self.leads.delete(id).await?;
        let now = self.clock.now();

        let mut session = self.session.lock().await;
        session.upstream.retain(|lead| lead.id != id);
        session.rederive(now);
        Ok(())
    }

    // =========================================================================
    //  ARRASTAR E SOLTAR
    // =========================================================================

    /// Só mexe na ordem visual; nada vai para o banco.
    pub async fn reorder(
        &self,
        status: LeadStatus,
        from_index: usize,
        to_index: usize,
    ) -> Result<BoardSnapshot, AppError> {
        let mut session = self.session.lock().await;
        session
            .board
            .reorder_within_column(status, from_index, to_index)?;
        Ok(session.snapshot())
    }

    pub async fn move_lead(
        &self,
        lead_id: Uuid,
        new_status: LeadStatus,
        position: Option<usize>,
    ) -> Result<MoveReceipt, AppError> {
        let mut session = self.session.lock().await;
        let outcome = session.board.move_to_column(lead_id, new_status, position)?;

        let changed_column = outcome.changed_column();
        let mut mutation_id = None;
        let mut notification_queued = false;

        for effect in outcome.effects {
            match effect {
                BoardEffect::Persist(lead) => {
                    let id = session.mutations.record(lead.clone(), outcome.previous_status);
                    mutation_id = Some(id);
                    self.enqueue_persist(&mut session, id, lead);
                }
                BoardEffect::Notify(lead) => {
                    notification_queued = self.notifications.enqueue(lead);
                }
            }
        }

        if changed_column {
            tracing::info!(
                lead_id = %lead_id,
                from = %outcome.previous_status,
                to = %new_status,
                notified = notification_queued,
                "📦 Lead movido de coluna"
            );
        }

        Ok(MoveReceipt {
            lead: outcome.lead,
            previous_status: outcome.previous_status,
            mutation_id,
            notification_queued,
        })
    }

    // A resposta do movimento não espera pela gravação.
    fn enqueue_persist(&self, session: &mut BoardSession, mutation_id: Uuid, lead: Lead) {
        if self.persist_tx.send(PersistJob { mutation_id, lead }).is_err() {
            tracing::error!(%mutation_id, "🔥 Fila de gravação fechada; movimento não gravado");
            if let Err(e) = session.mutations.fail(mutation_id, "fila de gravação fechada") {
                tracing::warn!(%mutation_id, "Falha não registrada: {}", e);
            }
        }
    }

    // =========================================================================
    //  CONFIRMAÇÕES (retry / rollback)
    // =========================================================================

    pub async fn mutations(&self) -> Vec<Mutation> {
        self.session.lock().await.mutations.all().to_vec()
    }

    pub async fn mutation(&self, id: Uuid) -> Result<Mutation, AppError> {
        let session = self.session.lock().await;
        session
            .mutations
            .get(id)
            .cloned()
            .ok_or_else(|| MutationError::NotFound(id).into())
    }

    /// Reenvia a gravação de um movimento que falhou.
    pub async fn retry(&self, id: Uuid) -> Result<Mutation, AppError> {
        let mut session = self.session.lock().await;

        // Reenviar por cima de um movimento mais novo voltaria o lead no tempo.
        if session.mutations.has_newer(id) {
            return Err(MutationError::Superseded(id).into());
        }
        let mutation = session.mutations.begin_retry(id)?;

        // O quadro volta a mostrar o status otimista enquanto reenvia.
        if let Err(e) = session.board.set_status(mutation.lead.id, mutation.lead.status) {
            tracing::debug!(mutation_id = %id, "Lead fora do quadro no retry: {}", e);
        }

        tracing::info!(mutation_id = %id, attempt = mutation.attempts, "🔁 Reenviando movimento");
        self.enqueue_persist(&mut session, id, mutation.lead.clone());
        Ok(mutation)
    }

    /// Desfaz localmente um movimento que falhou, voltando o status anterior.
    pub async fn rollback(&self, id: Uuid) -> Result<Mutation, AppError> {
        let mut session = self.session.lock().await;
        let mutation = session
            .mutations
            .get(id)
            .cloned()
            .ok_or(MutationError::NotFound(id))?;

        if !matches!(mutation.state, ConfirmationState::Failed { .. }) {
            return Err(MutationError::InvalidState {
                id,
                action: "desfeita",
            }
            .into());
        }

        // Se o lead já foi movido de novo, voltar o status apagaria o movimento novo.
        let moved_since = session
            .board
            .find(mutation.lead.id)
            .is_some_and(|current| current.status != mutation.lead.status);
        if moved_since || session.mutations.has_newer(id) {
            return Err(MutationError::Superseded(id).into());
        }

        let rolled_back = session.mutations.roll_back(id)?;
        if let Err(e) = session
            .board
            .set_status(rolled_back.lead.id, rolled_back.previous_status)
        {
            tracing::debug!(mutation_id = %id, "Lead fora do quadro no rollback: {}", e);
        }

        tracing::info!(
            mutation_id = %id,
            lead_id = %rolled_back.lead.id,
            status = %rolled_back.previous_status,
            "↩️ Movimento desfeito"
        );
        Ok(rolled_back)
    }
}
