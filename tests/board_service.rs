mod common;

use std::{sync::Arc, time::Duration};

use crm_board::{
    board::{ConfirmationState, MutationError},
    common::error::AppError,
    db::LeadRepository,
    models::{
        lead::{Lead, LeadStatus, NewLead},
        period::Period,
    },
    notify::{NotificationPolicy, NotificationQueue},
    services::{
        board_service::{BoardService, BoardSnapshot},
        lead_service::LeadService,
    },
};
use uuid::Uuid;

use common::{delivered, fixed_clock, lead, settled, FlakyRepo, RecordingSink};

struct Harness {
    repo: Arc<FlakyRepo>,
    sink: Arc<RecordingSink>,
    board: BoardService,
}

async fn harness(leads: Vec<Lead>) -> Harness {
    let repo = Arc::new(FlakyRepo::with_leads(leads));
    let sink = Arc::new(RecordingSink::default());
    let board = BoardService::new(
        LeadService::new(repo.clone()),
        NotificationPolicy::default(),
        NotificationQueue::spawn(sink.clone()),
        fixed_clock(),
    );
    board.sync(Period::CurrentMonth).await.unwrap();
    Harness { repo, sink, board }
}

fn column_names(snapshot: &BoardSnapshot, status: LeadStatus) -> Vec<String> {
    snapshot
        .columns
        .iter()
        .find(|column| column.status == status)
        .map(|column| column.leads.iter().map(|l| l.name.clone()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn move_to_meeting_pending_persists_and_notifies_once() {
    let h = harness(vec![lead(1, "Ana", LeadStatus::Contact)]).await;
    let id = Uuid::from_u128(1);

    let receipt = h
        .board
        .move_lead(id, LeadStatus::MeetingPending, None)
        .await
        .unwrap();
    assert_eq!(receipt.previous_status, LeadStatus::Contact);
    assert_eq!(receipt.lead.status, LeadStatus::MeetingPending);
    assert!(receipt.notification_queued);

    let mutation = settled(&h.board, receipt.mutation_id.unwrap()).await;
    assert_eq!(mutation.state, ConfirmationState::Confirmed);
    assert_eq!(h.repo.update_calls(), 1);

    let sent = delivered(&h.sink, 1).await;
    assert_eq!(sent.len(), 1);
    // O webhook recebe o registro já com o status novo e nada mais mudado.
    assert_eq!(sent[0], lead(1, "Ana", LeadStatus::MeetingPending));

    let stored = h.repo.list().await.unwrap();
    assert_eq!(stored[0].status, LeadStatus::MeetingPending);
}

#[tokio::test]
async fn move_to_closed_won_persists_without_notifying() {
    let h = harness(vec![lead(1, "Ana", LeadStatus::ProposalSent)]).await;

    let receipt = h
        .board
        .move_lead(Uuid::from_u128(1), LeadStatus::ClosedWon, None)
        .await
        .unwrap();
    assert!(!receipt.notification_queued);

    let mutation = settled(&h.board, receipt.mutation_id.unwrap()).await;
    assert_eq!(mutation.state, ConfirmationState::Confirmed);
    assert_eq!(h.repo.update_calls(), 1);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(h.sink.delivered().is_empty());
}

#[tokio::test]
async fn same_column_move_has_no_side_effects() {
    let h = harness(vec![
        lead(1, "Ana", LeadStatus::Contact),
        lead(2, "Beto", LeadStatus::Contact),
    ])
    .await;

    let receipt = h
        .board
        .move_lead(Uuid::from_u128(1), LeadStatus::Contact, Some(1))
        .await
        .unwrap();
    assert_eq!(receipt.mutation_id, None);
    assert!(!receipt.notification_queued);

    let snapshot = h.board.snapshot().await;
    assert_eq!(column_names(&snapshot, LeadStatus::Contact), ["Beto", "Ana"]);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(h.repo.update_calls(), 0);
    assert!(h.sink.delivered().is_empty());
    assert!(h.board.mutations().await.is_empty());
}

#[tokio::test]
async fn reorder_is_local_and_discarded_by_sync() {
    let h = harness(vec![
        lead(1, "Ana", LeadStatus::Contact),
        lead(2, "Beto", LeadStatus::Contact),
        lead(3, "Caio", LeadStatus::ClosedLost),
    ])
    .await;

    let snapshot = h.board.reorder(LeadStatus::Contact, 0, 1).await.unwrap();
    assert_eq!(column_names(&snapshot, LeadStatus::Contact), ["Beto", "Ana"]);
    assert_eq!(column_names(&snapshot, LeadStatus::ClosedLost), ["Caio"]);
    assert_eq!(h.repo.update_calls(), 0);

    let resynced = h.board.sync(Period::CurrentMonth).await.unwrap();
    assert_eq!(column_names(&resynced, LeadStatus::Contact), ["Ana", "Beto"]);
}

#[tokio::test]
async fn reorder_out_of_bounds_is_rejected() {
    let h = harness(vec![lead(1, "Ana", LeadStatus::Contact)]).await;
    let err = h.board.reorder(LeadStatus::Contact, 0, 5).await.unwrap_err();
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failed_persistence_can_be_retried() {
    let h = harness(vec![lead(1, "Ana", LeadStatus::Contact)]).await;
    h.repo.set_failing(true);

    let receipt = h
        .board
        .move_lead(Uuid::from_u128(1), LeadStatus::ProposalSent, None)
        .await
        .unwrap();
    let mutation_id = receipt.mutation_id.unwrap();

    let failed = settled(&h.board, mutation_id).await;
    assert!(matches!(failed.state, ConfirmationState::Failed { .. }));
    assert_eq!(h.board.snapshot().await.failed_mutations, 1);

    // O quadro continua mostrando o movimento otimista.
    let snapshot = h.board.snapshot().await;
    assert_eq!(column_names(&snapshot, LeadStatus::ProposalSent), ["Ana"]);

    h.repo.set_failing(false);
    let retried = h.board.retry(mutation_id).await.unwrap();
    assert_eq!(retried.attempts, 2);

    let confirmed = settled(&h.board, mutation_id).await;
    assert_eq!(confirmed.state, ConfirmationState::Confirmed);
    assert_eq!(h.repo.update_calls(), 2);
    assert_eq!(h.repo.list().await.unwrap()[0].status, LeadStatus::ProposalSent);
}

#[tokio::test]
async fn failed_move_survives_resync_and_can_be_rolled_back() {
    let h = harness(vec![lead(1, "Ana", LeadStatus::Contact)]).await;
    h.repo.set_failing(true);

    let mutation_id = h
        .board
        .move_lead(Uuid::from_u128(1), LeadStatus::ClosedWon, None)
        .await
        .unwrap()
        .mutation_id
        .unwrap();
    settled(&h.board, mutation_id).await;

    // O banco ainda tem "Contacto"; o quadro continua com o movimento.
    let resynced = h.board.sync(Period::CurrentMonth).await.unwrap();
    assert_eq!(column_names(&resynced, LeadStatus::ClosedWon), ["Ana"]);
    assert!(column_names(&resynced, LeadStatus::Contact).is_empty());
    assert_eq!(resynced.failed_mutations, 1);

    let rolled_back = h.board.rollback(mutation_id).await.unwrap();
    assert_eq!(rolled_back.state, ConfirmationState::RolledBack);

    let snapshot = h.board.snapshot().await;
    assert_eq!(column_names(&snapshot, LeadStatus::Contact), ["Ana"]);
    assert_eq!(snapshot.failed_mutations, 0);
}

#[tokio::test]
async fn back_to_back_moves_reach_the_store_in_order() {
    let h = harness(vec![lead(1, "Ana", LeadStatus::Contact)]).await;
    let id = Uuid::from_u128(1);
    h.repo.delay_next_update(Duration::from_millis(100));

    let first = h
        .board
        .move_lead(id, LeadStatus::ProposalSent, None)
        .await
        .unwrap()
        .mutation_id
        .unwrap();
    let second = h
        .board
        .move_lead(id, LeadStatus::ClosedWon, None)
        .await
        .unwrap()
        .mutation_id
        .unwrap();

    assert_eq!(settled(&h.board, first).await.state, ConfirmationState::Confirmed);
    assert_eq!(settled(&h.board, second).await.state, ConfirmationState::Confirmed);
    assert_eq!(h.repo.update_calls(), 2);

    let stored = h.repo.list().await.unwrap();
    assert_eq!(stored[0].status, LeadStatus::ClosedWon);

    let snapshot = h.board.snapshot().await;
    assert_eq!(column_names(&snapshot, LeadStatus::ClosedWon), ["Ana"]);
    assert!(column_names(&snapshot, LeadStatus::ProposalSent).is_empty());
}

#[tokio::test]
async fn form_edit_during_pending_move_keeps_both_changes() {
    let h = harness(vec![lead(1, "Ana", LeadStatus::Contact)]).await;
    h.repo.delay_next_update(Duration::from_millis(100));

    let mutation_id = h
        .board
        .move_lead(Uuid::from_u128(1), LeadStatus::MeetingPending, None)
        .await
        .unwrap()
        .mutation_id
        .unwrap();

    // O formulário é salvo enquanto a gravação do movimento ainda roda.
    let mut edited = lead(1, "Ana Souza", LeadStatus::MeetingPending);
    edited.notes = Some("prefere email".to_string());
    h.board.update_lead(&edited).await.unwrap();

    assert_eq!(settled(&h.board, mutation_id).await.state, ConfirmationState::Confirmed);

    let stored = h.repo.list().await.unwrap();
    assert_eq!(stored[0].name, "Ana Souza");
    assert_eq!(stored[0].notes.as_deref(), Some("prefere email"));
    assert_eq!(stored[0].status, LeadStatus::MeetingPending);

    let snapshot = h.board.snapshot().await;
    assert_eq!(column_names(&snapshot, LeadStatus::MeetingPending), ["Ana Souza"]);
}

#[tokio::test]
async fn failed_persistence_can_be_rolled_back() {
    let h = harness(vec![lead(1, "Ana", LeadStatus::Contact)]).await;
    h.repo.set_failing(true);

    let receipt = h
        .board
        .move_lead(Uuid::from_u128(1), LeadStatus::ClosedWon, None)
        .await
        .unwrap();
    let mutation_id = receipt.mutation_id.unwrap();
    settled(&h.board, mutation_id).await;

    let rolled_back = h.board.rollback(mutation_id).await.unwrap();
    assert_eq!(rolled_back.state, ConfirmationState::RolledBack);

    let snapshot = h.board.snapshot().await;
    assert_eq!(column_names(&snapshot, LeadStatus::Contact), ["Ana"]);
    assert!(column_names(&snapshot, LeadStatus::ClosedWon).is_empty());
    assert_eq!(snapshot.failed_mutations, 0);

    // Resolvida: não pode mais ser reenviada.
    assert!(matches!(
        h.board.retry(mutation_id).await,
        Err(AppError::Mutation(MutationError::InvalidState { .. }))
    ));
}

#[tokio::test]
async fn rollback_refuses_when_lead_moved_again() {
    let h = harness(vec![lead(1, "Ana", LeadStatus::Contact)]).await;
    h.repo.set_failing(true);
    let id = Uuid::from_u128(1);

    let first = h
        .board
        .move_lead(id, LeadStatus::ProposalSent, None)
        .await
        .unwrap()
        .mutation_id
        .unwrap();
    settled(&h.board, first).await;

    let second = h
        .board
        .move_lead(id, LeadStatus::ClosedLost, None)
        .await
        .unwrap()
        .mutation_id
        .unwrap();
    settled(&h.board, second).await;

    assert!(matches!(
        h.board.rollback(first).await,
        Err(AppError::Mutation(MutationError::Superseded(_)))
    ));
    assert!(matches!(
        h.board.retry(first).await,
        Err(AppError::Mutation(MutationError::Superseded(_)))
    ));
    // O mais recente ainda pode ser desfeito.
    h.board.rollback(second).await.unwrap();
    let snapshot = h.board.snapshot().await;
    assert_eq!(column_names(&snapshot, LeadStatus::ProposalSent), ["Ana"]);
}

#[tokio::test]
async fn crud_callbacks_refresh_the_board() {
    let h = harness(vec![lead(1, "Ana", LeadStatus::Contact)]).await;

    let created = h
        .board
        .create_lead(&NewLead {
            name: "Duda".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
            source: "Email".to_string(),
            value: rust_decimal::Decimal::from(80),
            status: LeadStatus::MeetingPending,
            service: "Otros".to_string(),
            country: "Perú".to_string(),
            payment_method: "Paypal".to_string(),
            notes: Some("ligar segunda".to_string()),
        })
        .await
        .unwrap();

    let snapshot = h.board.snapshot().await;
    assert_eq!(column_names(&snapshot, LeadStatus::MeetingPending), ["Duda"]);

    // Leads fora do período entram no banco mas não no quadro.
    let mut old = created.clone();
    old.date = chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    h.board.update_lead(&old).await.unwrap();
    let snapshot = h.board.snapshot().await;
    assert!(column_names(&snapshot, LeadStatus::MeetingPending).is_empty());

    h.board.delete_lead(Uuid::from_u128(1)).await.unwrap();
    let snapshot = h.board.snapshot().await;
    assert!(snapshot.columns.iter().all(|column| column.leads.is_empty()));

    assert!(matches!(
        h.board.delete_lead(Uuid::from_u128(1)).await,
        Err(AppError::LeadNotFound(_))
    ));

    // Nenhum callback de formulário dispara webhook.
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(h.sink.delivered().is_empty());
}

#[tokio::test]
async fn sync_applies_period_filter() {
    let mut last_year = lead(2, "Velho", LeadStatus::Contact);
    last_year.date = chrono::NaiveDate::from_ymd_opt(2023, 12, 20).unwrap();
    let mut may = lead(3, "Maio", LeadStatus::Contact);
    may.date = chrono::NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();

    let h = harness(vec![lead(1, "Ana", LeadStatus::Contact), last_year, may]).await;

    let current = h.board.snapshot().await;
    assert_eq!(current.period, Period::CurrentMonth);
    assert_eq!(column_names(&current, LeadStatus::Contact), ["Ana"]);

    let previous = h.board.sync(Period::PreviousMonth).await.unwrap();
    assert_eq!(column_names(&previous, LeadStatus::Contact), ["Maio"]);

    let year = h.board.sync(Period::CurrentYear).await.unwrap();
    assert_eq!(column_names(&year, LeadStatus::Contact), ["Ana", "Maio"]);
}
