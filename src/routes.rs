// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};

use crate::{config::AppState, handlers, middleware::auth::auth_guard};

pub fn app(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Sessão atual (protegida pelo middleware)
    let session_routes = Router::new()
        .route("/session", get(handlers::auth::get_session))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let lead_routes = Router::new()
        .route(
            "/",
            post(handlers::leads::create_lead).get(handlers::leads::list_leads),
        )
        .route(
            "/{id}",
            put(handlers::leads::update_lead).delete(handlers::leads::delete_lead),
        );

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .route("/charts", get(handlers::dashboard::get_charts));

    let board_routes = Router::new()
        .route("/", get(handlers::board::get_board))
        .route("/sync", post(handlers::board::sync_board))
        .route("/reorder", post(handlers::board::reorder))
        .route("/move", post(handlers::board::move_lead))
        .route("/mutations", get(handlers::board::list_mutations))
        .route("/mutations/{id}", get(handlers::board::get_mutation))
        .route("/mutations/{id}/retry", post(handlers::board::retry_mutation))
        .route(
            "/mutations/{id}/rollback",
            post(handlers::board::rollback_mutation),
        );

    // Combina tudo no router principal; leads, dashboard e quadro exigem token
    let guard = axum_middleware::from_fn_with_state(app_state.clone(), auth_guard);

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes.merge(session_routes))
        .nest("/api/leads", lead_routes.layer(guard.clone()))
        .nest("/api/dashboard", dashboard_routes.layer(guard.clone()))
        .nest("/api/board", board_routes.layer(guard))
        .with_state(app_state)
}
