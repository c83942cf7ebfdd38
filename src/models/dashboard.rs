// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::lead::LeadStatus;

// 1. Os Cards do Topo
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_leads: usize,
    pub total_sales: Decimal, // Soma do valor dos leads ganhos
    pub won_leads: usize,
    pub conversion_rate: Decimal, // Percentual (0-100), duas casas
}

// 2. Fatias dos gráficos de pizza (origem e serviço)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry {
    pub label: String,
    pub count: usize,
    pub percentage: Decimal,
}

// 3. Barras por etapa do funil
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: LeadStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    pub by_source: Vec<ChartEntry>,
    pub by_service: Vec<ChartEntry>,
    pub by_status: Vec<StatusCount>,
}
