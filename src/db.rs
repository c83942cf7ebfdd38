pub mod lead_repo;
pub use lead_repo::{LeadRepository, PgLeadRepository};
pub mod memory_repo;
pub use memory_repo::InMemoryLeadRepository;

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Abre a pool e roda as migrações do SQLx.
pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

    sqlx::migrate!().run(&db_pool).await?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    Ok(db_pool)
}
