// src/board/state.rs

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::lead::{Lead, LeadStatus};
use crate::notify::policy::NotificationPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Índice {index} fora da coluna '{status}' (tamanho {len})")]
    IndexOutOfBounds {
        status: LeadStatus,
        index: usize,
        len: usize,
    },

    #[error("Lead {0} não está no quadro")]
    LeadNotFound(Uuid),
}

/// Efeito colateral produzido por um movimento. Quem executa é o serviço.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEffect {
    Persist(Lead),
    Notify(Lead),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    pub lead: Lead,
    pub previous_status: LeadStatus,
    pub effects: Vec<BoardEffect>,
}

impl MoveOutcome {
    pub fn changed_column(&self) -> bool {
        self.previous_status != self.lead.status
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub status: LeadStatus,
    pub leads: Vec<Lead>,
}

/// Cópia local e ordenada dos leads exibidos no Kanban.
///
/// Só existe uma coleção; as colunas são projeções por status calculadas na
/// leitura. A ordem dentro de uma coluna é a ordem em que os leads aparecem
/// na coleção.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    leads: Vec<Lead>,
    policy: NotificationPolicy,
}

impl BoardState {
    pub fn new(leads: Vec<Lead>, policy: NotificationPolicy) -> Self {
        Self { leads, policy }
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    pub fn policy(&self) -> &NotificationPolicy {
        &self.policy
    }

    pub fn find(&self, lead_id: Uuid) -> Option<&Lead> {
        self.leads.iter().find(|lead| lead.id == lead_id)
    }

    pub fn column(&self, status: LeadStatus) -> Vec<&Lead> {
        self.leads.iter().filter(|lead| lead.status == status).collect()
    }

    pub fn columns(&self) -> Vec<BoardColumn> {
        LeadStatus::ALL
            .into_iter()
            .map(|status| BoardColumn {
                status,
                leads: self.column(status).into_iter().cloned().collect(),
            })
            .collect()
    }

    /// Substitui toda a coleção. Reordenações locais não persistidas se perdem.
    pub fn replace_leads(&mut self, leads: Vec<Lead>) {
        self.leads = leads;
    }

    // Posições, na coleção, dos leads de uma coluna (em ordem de exibição).
    fn partition_slots(&self, status: LeadStatus) -> Vec<usize> {
        self.leads
            .iter()
            .enumerate()
            .filter(|(_, lead)| lead.status == status)
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Arrasta um card dentro da mesma coluna. Não persiste e não notifica.
    pub fn reorder_within_column(
        &mut self,
        status: LeadStatus,
        from_index: usize,
        to_index: usize,
    ) -> Result<(), BoardError> {
        let slots = self.partition_slots(status);
        let len = slots.len();

        for index in [from_index, to_index] {
            if index >= len {
                return Err(BoardError::IndexOutOfBounds { status, index, len });
            }
        }

        if from_index == to_index {
            return Ok(());
        }

        let mut partition: Vec<Lead> = slots.iter().map(|&slot| self.leads[slot].clone()).collect();
        let dragged = partition.remove(from_index);
        partition.insert(to_index, dragged);

        // Os leads da coluna voltam para os mesmos slots; os demais não se mexem.
        for (slot, lead) in slots.into_iter().zip(partition) {
            self.leads[slot] = lead;
        }

        Ok(())
    }

    /// Solta um card em uma coluna, opcionalmente numa posição.
    ///
    /// Mesmo status: vira reordenação pura (sem efeitos). Status diferente:
    /// o status é trocado localmente na hora e os efeitos `Persist` e,
    /// se a política mandar, `Notify` são devolvidos nessa ordem.
    pub fn move_to_column(
        &mut self,
        lead_id: Uuid,
        new_status: LeadStatus,
        position: Option<usize>,
    ) -> Result<MoveOutcome, BoardError> {
        let slot = self
            .leads
            .iter()
            .position(|lead| lead.id == lead_id)
            .ok_or(BoardError::LeadNotFound(lead_id))?;

        let previous_status = self.leads[slot].status;
        self.leads[slot].status = new_status;

        if let Some(target) = position {
            let slots = self.partition_slots(new_status);
            let from_index = slots
                .iter()
                .position(|&s| s == slot)
                .ok_or(BoardError::LeadNotFound(lead_id))?;
            let to_index = target.min(slots.len() - 1);
            self.reorder_within_column(new_status, from_index, to_index)?;
        }

        let lead = self
            .find(lead_id)
            .cloned()
            .ok_or(BoardError::LeadNotFound(lead_id))?;

        let mut effects = Vec::new();
        if previous_status != new_status {
            effects.push(BoardEffect::Persist(lead.clone()));
            if self.policy.should_notify(new_status) {
                effects.push(BoardEffect::Notify(lead.clone()));
            }
        }

        Ok(MoveOutcome {
            lead,
            previous_status,
            effects,
        })
    }

    /// Troca o status sem gerar efeitos (usado no rollback e na sobreposição
    /// de mutações pendentes).
    pub fn set_status(&mut self, lead_id: Uuid, status: LeadStatus) -> Result<(), BoardError> {
        let lead = self
            .leads
            .iter_mut()
            .find(|lead| lead.id == lead_id)
            .ok_or(BoardError::LeadNotFound(lead_id))?;
        lead.status = status;
        Ok(())
    }
}
