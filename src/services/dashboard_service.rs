// src/services/dashboard_service.rs

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::{
        dashboard::{ChartEntry, DashboardCharts, DashboardSummary, StatusCount},
        lead::{Lead, LeadStatus},
        period::Period,
    },
    services::lead_service::LeadService,
};

#[derive(Clone)]
pub struct DashboardService {
    leads: LeadService,
}

impl DashboardService {
    pub fn new(leads: LeadService) -> Self {
        Self { leads }
    }

    pub async fn get_summary(
        &self,
        period: Period,
        now: NaiveDateTime,
    ) -> Result<DashboardSummary, AppError> {
        let leads = self.leads.list_for_period(period, now).await?;
        Ok(summarize(&leads))
    }

    pub async fn get_charts(
        &self,
        period: Period,
        now: NaiveDateTime,
    ) -> Result<DashboardCharts, AppError> {
        let leads = self.leads.list_for_period(period, now).await?;
        Ok(breakdown(&leads))
    }
}

fn percentage(part: usize, total: usize) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(total)).round_dp(2)
}

pub fn summarize(leads: &[Lead]) -> DashboardSummary {
    let won: Vec<&Lead> = leads
        .iter()
        .filter(|lead| lead.status == LeadStatus::ClosedWon)
        .collect();

    DashboardSummary {
        total_leads: leads.len(),
        total_sales: won.iter().map(|lead| lead.value).sum(),
        won_leads: won.len(),
        conversion_rate: percentage(won.len(), leads.len()),
    }
}

// Conta ocorrências preservando a ordem em que cada rótulo apareceu.
fn count_by<'a>(leads: &'a [Lead], key: impl Fn(&'a Lead) -> &'a str) -> Vec<ChartEntry> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for lead in leads {
        let label = key(lead);
        match counts.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    counts
        .into_iter()
        .map(|(label, count)| ChartEntry {
            label: label.to_string(),
            count,
            percentage: percentage(count, leads.len()),
        })
        .collect()
}

pub fn breakdown(leads: &[Lead]) -> DashboardCharts {
    let by_status = LeadStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: leads.iter().filter(|lead| lead.status == status).count(),
        })
        .collect();

    DashboardCharts {
        by_source: count_by(leads, |lead| lead.source.as_str()),
        by_service: count_by(leads, |lead| lead.service.as_str()),
        by_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn lead(source: &str, service: &str, status: LeadStatus, value: i64) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            name: "Cliente".into(),
            date: NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
            source: source.into(),
            value: Decimal::from(value),
            status,
            service: service.into(),
            country: "México".into(),
            payment_method: "No aplica".into(),
            notes: None,
        }
    }

    #[test]
    fn summary_of_empty_period_is_zeroed() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_leads, 0);
        assert_eq!(summary.total_sales, Decimal::ZERO);
        assert_eq!(summary.conversion_rate, Decimal::ZERO);
    }

    #[test]
    fn summary_sums_only_won_leads() {
        let leads = vec![
            lead("Email", "Otros", LeadStatus::ClosedWon, 300),
            lead("Email", "Otros", LeadStatus::ClosedWon, 200),
            lead("Email", "Otros", LeadStatus::ClosedLost, 999),
        ];
        let summary = summarize(&leads);
        assert_eq!(summary.total_leads, 3);
        assert_eq!(summary.won_leads, 2);
        assert_eq!(summary.total_sales, Decimal::from(500));
        assert_eq!(summary.conversion_rate, Decimal::new(6667, 2));
    }

    #[test]
    fn breakdown_keeps_first_seen_order_and_all_columns() {
        let leads = vec![
            lead("Whatsapp", "Linkbuilding", LeadStatus::Contact, 1),
            lead("Email", "Linkbuilding", LeadStatus::Contact, 1),
            lead("Whatsapp", "Desarrollo Web", LeadStatus::ClosedWon, 1),
            lead("Whatsapp", "Linkbuilding", LeadStatus::Contact, 1),
        ];
        let charts = breakdown(&leads);

        let sources: Vec<(&str, usize)> = charts
            .by_source
            .iter()
            .map(|e| (e.label.as_str(), e.count))
            .collect();
        assert_eq!(sources, vec![("Whatsapp", 3), ("Email", 1)]);
        assert_eq!(charts.by_source[0].percentage, Decimal::from(75));
        assert_eq!(charts.by_service[1].label, "Desarrollo Web");

        let statuses: Vec<usize> = charts.by_status.iter().map(|s| s.count).collect();
        assert_eq!(statuses, vec![3, 0, 0, 1, 0]);
    }
}
