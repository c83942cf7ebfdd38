//src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crm_board::{
    config::{AppState, Settings},
    models::period::Period,
    routes,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger. RUST_LOG sobrescreve o nível padrão.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env().context("Falha ao carregar a configuração.")?;
    let app_state = AppState::new(&settings)
        .await
        .context("Falha ao inicializar o estado da aplicação.")?;

    // Primeira carga do quadro; sem ela o Kanban começa vazio até o primeiro /sync.
    if let Err(e) = app_state.board_service.sync(Period::default()).await {
        tracing::warn!("⚠️ Carga inicial do quadro falhou: {}", e);
    }

    let app = routes::app(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", settings.bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}
