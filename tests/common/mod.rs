#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crm_board::{
    board::{ConfirmationState, Mutation},
    common::error::AppError,
    db::{InMemoryLeadRepository, LeadRepository},
    models::lead::{Lead, LeadStatus, NewLead},
    notify::{NotificationSink, NotifyError},
    services::{board_service::BoardService, clock::Clock},
};

/// 15/06/2024 10:30, meio do mês: datas de junho caem em "Este mes".
pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap()
}

pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

pub fn lead(n: u128, name: &str, status: LeadStatus) -> Lead {
    Lead {
        id: Uuid::from_u128(n),
        name: name.to_string(),
        date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        source: "Whatsapp".to_string(),
        value: Decimal::from(500),
        status,
        service: "Servicios SEO".to_string(),
        country: "Chile".to_string(),
        payment_method: "No aplica".to_string(),
        notes: None,
    }
}

/// Envolve o repositório em memória contando as gravações e permitindo
/// forçar falhas ou lentidão no `update`.
#[derive(Default)]
pub struct FlakyRepo {
    inner: InMemoryLeadRepository,
    fail_updates: AtomicBool,
    next_update_delay_ms: AtomicU64,
    updates: AtomicUsize,
}

impl FlakyRepo {
    pub fn with_leads(leads: Vec<Lead>) -> Self {
        Self {
            inner: InMemoryLeadRepository::with_leads(leads),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_updates.store(failing, Ordering::SeqCst);
    }

    /// Só o próximo `update` demora.
    pub fn delay_next_update(&self, delay: Duration) {
        self.next_update_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LeadRepository for FlakyRepo {
    async fn create(&self, lead: &NewLead) -> Result<Lead, AppError> {
        self.inner.create(lead).await
    }

    async fn list(&self) -> Result<Vec<Lead>, AppError> {
        self.inner.list().await
    }

    async fn update(&self, lead: &Lead) -> Result<Lead, AppError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let delay_ms = self.next_update_delay_ms.swap(0, Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError(anyhow::anyhow!(
                "banco indisponível"
            )));
        }
        self.inner.update(lead).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.inner.delete(id).await
    }
}

#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<Lead>>,
}

impl RecordingSink {
    pub fn delivered(&self) -> Vec<Lead> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, lead: &Lead) -> Result<(), NotifyError> {
        self.delivered.lock().unwrap().push(lead.clone());
        Ok(())
    }
}

/// Espera a mutação sair de `Pending` (a gravação roda em outra task).
pub async fn settled(board: &BoardService, id: Uuid) -> Mutation {
    for _ in 0..200 {
        let mutation = board.mutation(id).await.unwrap();
        if mutation.state != ConfirmationState::Pending {
            return mutation;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("mutação {id} continuou pendente");
}

/// Espera até `expected` notificações chegarem ao sink.
pub async fn delivered(sink: &RecordingSink, expected: usize) -> Vec<Lead> {
    for _ in 0..200 {
        let leads = sink.delivered();
        if leads.len() >= expected {
            return leads;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    sink.delivered()
}
