// src/models/period.rs

use serde::{Deserialize, Serialize};

/// Período selecionado no topo do dashboard.
/// Aceita também os rótulos usados pelo frontend antigo ("Este mes", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    #[serde(alias = "Este mes")]
    CurrentMonth,
    #[serde(alias = "Mes Pasado")]
    PreviousMonth,
    #[serde(rename = "last_60_days", alias = "Ultimos 60 Días", alias = "Últimos 60 Días")]
    Last60Days,
    #[serde(rename = "last_90_days", alias = "Ultimos 90 Días", alias = "Últimos 90 Días")]
    Last90Days,
    #[serde(alias = "Este año")]
    CurrentYear,
}
