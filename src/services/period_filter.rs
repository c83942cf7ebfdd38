// src/services/period_filter.rs

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{lead::Lead, period::Period};

/// Janela de datas de um período, calculada a partir de "agora".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBounds {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    // Mês passado inclui o primeiro dia; os demais períodos são abertos nas duas pontas.
    inclusive_start: bool,
}

impl PeriodBounds {
    /// A data do lead vale como meia-noite daquele dia.
    pub fn contains(&self, date: NaiveDate) -> bool {
        let at = date.and_time(NaiveTime::MIN);
        let after_start = if self.inclusive_start {
            at >= self.start
        } else {
            at > self.start
        };
        after_start && at < self.end
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

fn first_of_year(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.ordinal0()))
}

pub fn period_bounds(period: Period, now: NaiveDateTime) -> PeriodBounds {
    let today = now.date();
    let midnight = |date: NaiveDate| date.and_time(NaiveTime::MIN);

    match period {
        Period::CurrentMonth => PeriodBounds {
            start: midnight(first_of_month(today)),
            end: now,
            inclusive_start: false,
        },
        Period::PreviousMonth => {
            let this_month = first_of_month(today);
            let last_day_of_previous = this_month - Days::new(1);
            PeriodBounds {
                start: midnight(first_of_month(last_day_of_previous)),
                end: midnight(this_month),
                inclusive_start: true,
            }
        }
        Period::Last60Days => PeriodBounds {
            start: now - Days::new(60),
            end: now,
            inclusive_start: false,
        },
        Period::Last90Days => PeriodBounds {
            start: now - Days::new(90),
            end: now,
            inclusive_start: false,
        },
        Period::CurrentYear => PeriodBounds {
            start: midnight(first_of_year(today)),
            end: now,
            inclusive_start: false,
        },
    }
}

/// Mantém a ordem original; só remove quem está fora da janela.
pub fn filter_leads(leads: &[Lead], period: Period, now: NaiveDateTime) -> Vec<Lead> {
    let bounds = period_bounds(period, now);
    leads
        .iter()
        .filter(|lead| bounds.contains(lead.date))
        .cloned()
        .collect()
}
