// src/models/lead.rs

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

// --- ENUMS ---

/// Etapa do funil. A ordem das variantes é a ordem das colunas do Kanban.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LeadStatus {
    #[default]
    #[serde(rename = "Contacto")]
    Contact,
    #[serde(rename = "Propuesta Enviada")]
    ProposalSent,
    #[serde(rename = "Reunión Pendiente")]
    MeetingPending,
    #[serde(rename = "Cerrado - Ganado")]
    ClosedWon,
    #[serde(rename = "Cerrado - Perdido")]
    ClosedLost,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::Contact,
        LeadStatus::ProposalSent,
        LeadStatus::MeetingPending,
        LeadStatus::ClosedWon,
        LeadStatus::ClosedLost,
    ];

    /// O texto gravado no banco e exibido no quadro.
    pub fn label(self) -> &'static str {
        match self {
            LeadStatus::Contact => "Contacto",
            LeadStatus::ProposalSent => "Propuesta Enviada",
            LeadStatus::MeetingPending => "Reunión Pendiente",
            LeadStatus::ClosedWon => "Cerrado - Ganado",
            LeadStatus::ClosedLost => "Cerrado - Perdido",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Status de lead desconhecido: '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for LeadStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.label() == trimmed)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// --- CATÁLOGOS (valores aceitos nos formulários) ---

pub const SOURCES: &[&str] = &[
    "Forobeta",
    "Sitio Web",
    "Email",
    "Whatsapp",
    "Referencia",
    "Cliente Anterior",
    "Facebook Ads",
    "Redes Sociales",
    "Otros",
];

pub const SERVICES: &[&str] = &[
    "Servicios SEO",
    "Content Marketing",
    "Automatizaciones",
    "Linkbuilding",
    "Desarrollo Web",
    "Consultoría",
    "Otros",
];

pub const COUNTRIES: &[&str] = &[
    "Argentina",
    "Bolivia",
    "Brasil",
    "Chile",
    "Colombia",
    "Costa Rica",
    "Cuba",
    "Ecuador",
    "El Salvador",
    "España",
    "Estados Unidos",
    "Guatemala",
    "Honduras",
    "México",
    "Nicaragua",
    "Panamá",
    "Paraguay",
    "Perú",
    "Puerto Rico",
    "República Dominicana",
    "Uruguay",
    "Venezuela",
    "Otros",
];

pub const PAYMENT_METHODS: &[&str] = &[
    "No aplica",
    "Binance",
    "Paypal",
    "Criptomonedas",
    "VES",
    "Otros",
];

pub const DEFAULT_PAYMENT_METHOD: &str = "No aplica";

// --- LEAD (O Dado) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub source: String,
    pub value: Decimal,
    pub status: LeadStatus,
    pub service: String,
    pub country: String,
    pub payment_method: String,
    pub notes: Option<String>,
}

impl Lead {
    /// Cópia do lead com outro status; nenhum outro campo muda.
    pub fn with_status(&self, status: LeadStatus) -> Lead {
        Lead {
            status,
            ..self.clone()
        }
    }
}

/// Forma transitória, antes do banco atribuir o `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    pub name: String,
    pub date: NaiveDate,
    pub source: String,
    pub value: Decimal,
    pub status: LeadStatus,
    pub service: String,
    pub country: String,
    pub payment_method: String,
    pub notes: Option<String>,
}

impl NewLead {
    pub fn with_id(self, id: Uuid) -> Lead {
        Lead {
            id,
            name: self.name,
            date: self.date,
            source: self.source,
            value: self.value,
            status: self.status,
            service: self.service,
            country: self.country,
            payment_method: self.payment_method,
            notes: self.notes,
        }
    }
}

// Linha crua da tabela `leads`. O status chega como TEXT.
#[derive(Debug, FromRow)]
pub struct LeadRow {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub source: String,
    pub value: Decimal,
    pub status: String,
    pub service: String,
    pub country: String,
    pub payment_method: String,
    pub notes: Option<String>,
}

impl TryFrom<LeadRow> for Lead {
    type Error = UnknownStatus;

    fn try_from(row: LeadRow) -> Result<Self, Self::Error> {
        Ok(Lead {
            id: row.id,
            name: row.name,
            date: row.date,
            source: row.source,
            value: row.value,
            status: row.status.parse()?,
            service: row.service,
            country: row.country,
            payment_method: row.payment_method,
            notes: row.notes,
        })
    }
}
