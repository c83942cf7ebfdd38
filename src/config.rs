// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use chrono::TimeDelta;

use crate::{
    db::{self, InMemoryLeadRepository, LeadRepository, PgLeadRepository},
    notify::{DisabledNotifier, NotificationPolicy, NotificationQueue, NotificationSink, WebhookNotifier},
    services::{
        auth::AuthService, board_service::BoardService, clock::Clock,
        dashboard_service::DashboardService, lead_service::LeadService,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadStore {
    Postgres,
    Memory,
}

impl FromStr for LeadStore {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(LeadStore::Postgres),
            "memory" | "mem" => Ok(LeadStore::Memory),
            other => bail!("LEAD_STORE inválido: '{}' (use 'postgres' ou 'memory')", other),
        }
    }
}

/// Tudo que vem de variáveis de ambiente (e do `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub lead_store: LeadStore,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub admin_username: String,
    pub admin_password_hash: String,
    pub session_ttl: TimeDelta,
    pub webhook_url: Option<String>,
    pub webhook_policy: NotificationPolicy,
    pub webhook_timeout: Duration,
    pub bind_addr: String,
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<String> {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .with_context(|| format!("{} deve ser definida", key))
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} inválida ('{}'): {}", key, raw, e)),
        None => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let lead_store = parsed(&lookup, "LEAD_STORE", LeadStore::Postgres)?;

        let database_url = match lead_store {
            LeadStore::Postgres => Some(required(&lookup, "DATABASE_URL")?),
            LeadStore::Memory => lookup("DATABASE_URL"),
        };

        let session_ttl_hours: i64 = parsed(&lookup, "SESSION_TTL_HOURS", 24)?;
        if session_ttl_hours <= 0 {
            bail!("SESSION_TTL_HOURS deve ser positivo");
        }

        let webhook_timeout_secs: u64 = parsed(&lookup, "WEBHOOK_TIMEOUT_SECS", 10)?;

        Ok(Self {
            lead_store,
            database_url,
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            admin_username: required(&lookup, "ADMIN_USERNAME")?,
            admin_password_hash: required(&lookup, "ADMIN_PASSWORD_HASH")?,
            session_ttl: TimeDelta::hours(session_ttl_hours),
            webhook_url: lookup("WEBHOOK_URL").filter(|url| !url.trim().is_empty()),
            webhook_policy: parsed(&lookup, "WEBHOOK_TRIGGER_STATUSES", NotificationPolicy::default())?,
            webhook_timeout: Duration::from_secs(webhook_timeout_secs),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub lead_service: LeadService,
    pub board_service: BoardService,
    pub dashboard_service: DashboardService,
    pub clock: Clock,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let repo: Arc<dyn LeadRepository> = match settings.lead_store {
            LeadStore::Postgres => {
                let database_url = settings
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;
                let db_pool = db::connect(database_url).await?;
                Arc::new(PgLeadRepository::new(db_pool))
            }
            LeadStore::Memory => {
                tracing::warn!("⚠️ LEAD_STORE=memory: os leads não sobrevivem a um restart");
                Arc::new(InMemoryLeadRepository::new())
            }
        };

        let sink: Arc<dyn NotificationSink> = match &settings.webhook_url {
            Some(url) => Arc::new(
                WebhookNotifier::new(url.clone(), settings.webhook_timeout)
                    .context("Falha ao criar o cliente HTTP do webhook")?,
            ),
            None => {
                tracing::warn!("WEBHOOK_URL ausente: notificações serão descartadas");
                Arc::new(DisabledNotifier)
            }
        };

        Ok(Self::from_parts(settings, repo, sink, Clock::system()))
    }

    /// Monta o gráfico de dependências a partir de peças já prontas.
    pub fn from_parts(
        settings: &Settings,
        repo: Arc<dyn LeadRepository>,
        sink: Arc<dyn NotificationSink>,
        clock: Clock,
    ) -> Self {
        let lead_service = LeadService::new(repo);
        let notifications = NotificationQueue::spawn(sink);
        let board_service = BoardService::new(
            lead_service.clone(),
            settings.webhook_policy.clone(),
            notifications,
            clock.clone(),
        );

        Self {
            auth_service: AuthService::new(
                settings.admin_username.clone(),
                settings.admin_password_hash.clone(),
                settings.jwt_secret.clone(),
                settings.session_ttl,
            ),
            dashboard_service: DashboardService::new(lead_service.clone()),
            lead_service,
            board_service,
            clock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::models::lead::LeadStatus;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/crm"),
        ("JWT_SECRET", "s3cr3t"),
        ("ADMIN_USERNAME", "admin"),
        ("ADMIN_PASSWORD_HASH", "$2b$04$abcdefghijklmnopqrstuv"),
    ];

    #[test]
    fn defaults_apply_when_optional_values_are_missing() {
        let settings = Settings::from_lookup(lookup_from(BASE)).unwrap();
        assert_eq!(settings.lead_store, LeadStore::Postgres);
        assert_eq!(settings.session_ttl, TimeDelta::hours(24));
        assert_eq!(settings.webhook_policy, NotificationPolicy::default());
        assert_eq!(settings.webhook_url, None);
        assert_eq!(settings.webhook_timeout, Duration::from_secs(10));
        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn trigger_statuses_come_from_configuration() {
        let mut pairs = BASE.to_vec();
        pairs.push(("WEBHOOK_TRIGGER_STATUSES", "Cerrado - Ganado"));
        pairs.push(("WEBHOOK_URL", "https://hooks.example.com/crm"));
        let settings = Settings::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(settings.webhook_policy.triggers(), &[LeadStatus::ClosedWon]);
        assert_eq!(settings.webhook_url.as_deref(), Some("https://hooks.example.com/crm"));
    }

    #[test]
    fn memory_store_does_not_need_a_database() {
        let pairs: Vec<(&str, &str)> = BASE
            .iter()
            .copied()
            .filter(|(k, _)| *k != "DATABASE_URL")
            .chain([("LEAD_STORE", "memory")])
            .collect();
        let settings = Settings::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(settings.lead_store, LeadStore::Memory);
        assert!(settings.database_url.is_none());
    }

    #[test]
    fn missing_or_invalid_values_fail() {
        let no_secret: Vec<(&str, &str)> = BASE
            .iter()
            .copied()
            .filter(|(k, _)| *k != "JWT_SECRET")
            .collect();
        let err = Settings::from_lookup(lookup_from(&no_secret)).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));

        let mut bad_ttl = BASE.to_vec();
        bad_ttl.push(("SESSION_TTL_HOURS", "abc"));
        assert!(Settings::from_lookup(lookup_from(&bad_ttl)).is_err());

        let mut bad_trigger = BASE.to_vec();
        bad_trigger.push(("WEBHOOK_TRIGGER_STATUSES", "Pendiente"));
        assert!(Settings::from_lookup(lookup_from(&bad_trigger)).is_err());
    }
}
