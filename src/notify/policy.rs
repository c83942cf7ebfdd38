// src/notify/policy.rs

use std::str::FromStr;

use crate::models::lead::{LeadStatus, UnknownStatus};

/// Conjunto de colunas que disparam o webhook quando um lead entra nelas.
/// Vem da configuração (`WEBHOOK_TRIGGER_STATUSES`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPolicy {
    triggers: Vec<LeadStatus>,
}

impl Default for NotificationPolicy {
    fn default() -> Self {
        Self::new([LeadStatus::ProposalSent, LeadStatus::MeetingPending])
    }
}

impl NotificationPolicy {
    pub fn new(triggers: impl IntoIterator<Item = LeadStatus>) -> Self {
        let mut unique = Vec::new();
        for status in triggers {
            if !unique.contains(&status) {
                unique.push(status);
            }
        }
        Self { triggers: unique }
    }

    pub fn disabled() -> Self {
        Self { triggers: Vec::new() }
    }

    pub fn triggers(&self) -> &[LeadStatus] {
        &self.triggers
    }

    pub fn should_notify(&self, target: LeadStatus) -> bool {
        self.triggers.contains(&target)
    }
}

// Lista separada por vírgulas: "Propuesta Enviada,Reunión Pendiente".
// String vazia desliga as notificações.
impl FromStr for NotificationPolicy {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let statuses = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(LeadStatus::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(statuses))
    }
}
