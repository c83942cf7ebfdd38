// src/board/mutations.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::lead::{Lead, LeadStatus};

// Quantas mutações já resolvidas (confirmadas ou desfeitas) mantemos no histórico.
const MAX_SETTLED: usize = 200;

/// Pendente → Confirmada | Falhou; Falhou → Pendente (retry) | Desfeita (rollback)
/// | Superada (um movimento mais novo do mesmo lead foi confirmado).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ConfirmationState {
    Pending,
    Confirmed,
    Failed { reason: String },
    RolledBack,
    Superseded,
}

impl ConfirmationState {
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            ConfirmationState::Confirmed
                | ConfirmationState::RolledBack
                | ConfirmationState::Superseded
        )
    }
}

/// Um movimento de coluna aplicado localmente e enviado ao banco.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    pub id: Uuid,
    pub lead: Lead,
    pub previous_status: LeadStatus,
    #[serde(flatten)]
    pub state: ConfirmationState,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("Mutação {0} não encontrada")]
    NotFound(Uuid),

    #[error("Mutação {id} não pode ser {action} no estado atual")]
    InvalidState { id: Uuid, action: &'static str },

    #[error("O lead da mutação {0} mudou depois dela; rollback recusado")]
    Superseded(Uuid),
}

#[derive(Debug, Default)]
pub struct MutationLog {
    entries: Vec<Mutation>,
}

impl MutationLog {
    pub fn record(&mut self, lead: Lead, previous_status: LeadStatus) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.entries.push(Mutation {
            id,
            lead,
            previous_status,
            state: ConfirmationState::Pending,
            attempts: 1,
            created_at: now,
            updated_at: now,
        });
        self.prune();
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&Mutation> {
        self.entries.iter().find(|m| m.id == id)
    }

    pub fn all(&self) -> &[Mutation] {
        &self.entries
    }

    pub fn pending(&self) -> impl Iterator<Item = &Mutation> {
        self.entries
            .iter()
            .filter(|m| m.state == ConfirmationState::Pending)
    }

    /// Pendentes e falhas, na ordem em que foram registradas. São os
    /// movimentos que o quadro ainda mostra sem o banco ter confirmado.
    pub fn unsettled(&self) -> impl Iterator<Item = &Mutation> {
        self.entries.iter().filter(|m| !m.state.is_settled())
    }

    /// Existe um movimento posterior (não desfeito) para o mesmo lead?
    pub fn has_newer(&self, id: Uuid) -> bool {
        let Some(index) = self.entries.iter().position(|m| m.id == id) else {
            return false;
        };
        let lead_id = self.entries[index].lead.id;
        self.entries[index + 1..]
            .iter()
            .any(|m| m.lead.id == lead_id && m.state != ConfirmationState::RolledBack)
    }

    pub fn count_failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|m| matches!(m.state, ConfirmationState::Failed { .. }))
            .count()
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut Mutation, MutationError> {
        self.entries
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(MutationError::NotFound(id))
    }

    fn transition(
        &mut self,
        id: Uuid,
        action: &'static str,
        allowed: fn(&ConfirmationState) -> bool,
        next: ConfirmationState,
    ) -> Result<&mut Mutation, MutationError> {
        let mutation = self.get_mut(id)?;
        if !allowed(&mutation.state) {
            return Err(MutationError::InvalidState { id, action });
        }
        mutation.state = next;
        mutation.updated_at = Utc::now();
        Ok(mutation)
    }

    pub fn confirm(&mut self, id: Uuid, saved: Lead) -> Result<(), MutationError> {
        let mutation = self.transition(
            id,
            "confirmada",
            |s| *s == ConfirmationState::Pending,
            ConfirmationState::Confirmed,
        )?;
        mutation.lead = saved;
        let lead_id = mutation.lead.id;

        // Falhas mais antigas do mesmo lead ficaram para trás.
        if let Some(index) = self.entries.iter().position(|m| m.id == id) {
            let now = Utc::now();
            for older in &mut self.entries[..index] {
                if older.lead.id == lead_id && matches!(older.state, ConfirmationState::Failed { .. }) {
                    older.state = ConfirmationState::Superseded;
                    older.updated_at = now;
                }
            }
        }

        self.prune();
        Ok(())
    }

    pub fn fail(&mut self, id: Uuid, reason: impl Into<String>) -> Result<(), MutationError> {
        self.transition(
            id,
            "marcada como falha",
            |s| *s == ConfirmationState::Pending,
            ConfirmationState::Failed {
                reason: reason.into(),
            },
        )?;
        Ok(())
    }

    /// Volta uma mutação que falhou para `Pending` e devolve o lead a reenviar.
    pub fn begin_retry(&mut self, id: Uuid) -> Result<Mutation, MutationError> {
        let mutation = self.transition(
            id,
            "reenviada",
            |s| matches!(s, ConfirmationState::Failed { .. }),
            ConfirmationState::Pending,
        )?;
        mutation.attempts += 1;
        Ok(mutation.clone())
    }

    pub fn roll_back(&mut self, id: Uuid) -> Result<Mutation, MutationError> {
        let mutation = self.transition(
            id,
            "desfeita",
            |s| matches!(s, ConfirmationState::Failed { .. }),
            ConfirmationState::RolledBack,
        )?;
        let snapshot = mutation.clone();
        self.prune();
        Ok(snapshot)
    }

    // Descarta as resolvidas mais antigas; pendentes e falhas nunca saem.
    fn prune(&mut self) {
        let settled = self.entries.iter().filter(|m| m.state.is_settled()).count();
        let mut excess = settled.saturating_sub(MAX_SETTLED);
        if excess == 0 {
            return;
        }
        self.entries.retain(|m| {
            if excess > 0 && m.state.is_settled() {
                excess -= 1;
                false
            } else {
                true
            }
        });
    }
}
