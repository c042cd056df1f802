pub mod dispatch;
pub mod error;
pub mod routes;
pub mod state;
pub mod trigger;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use rota_core::config::Config;
use rota_core::rotation::RedbRotationStore;
use tower_http::trace::TraceLayer;

use dispatch::RotationDispatcher;
use state::AppState;
use trigger::{DisabledSelectionTrigger, HttpSelectionTrigger, SelectionTrigger};

/// Build the axum Router for the slash-command endpoint.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", post(routes::slash::handle_command))
        .route("/slack/command", post(routes::slash::handle_command))
        .route("/roster", get(routes::roster::get_roster))
        .route("/healthz", get(routes::health::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Wire the production collaborators described by `config`.
pub fn app_state_from_config(config: &Config) -> anyhow::Result<AppState> {
    let store = RedbRotationStore::open(&config.store.path)?;
    let trigger: Arc<dyn SelectionTrigger> = match &config.selection.url {
        Some(url) => Arc::new(HttpSelectionTrigger::new(&config.selection.name, url)),
        None => Arc::new(DisabledSelectionTrigger::new(&config.selection.name)),
    };
    let dispatcher = RotationDispatcher::new(
        Arc::new(store),
        trigger,
        Arc::from(config.secret.source()),
    );
    Ok(AppState::new(dispatcher))
}

/// Start the server on a pre-bound listener.
///
/// Lets the caller read the actual port first (useful when `port = 0`).
pub async fn serve_on(config: &Config, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(app_state_from_config(config)?);

    tracing::info!(
        store = %config.store.path.display(),
        selection = %config.selection.name,
        "rota listening on http://localhost:{actual_port}"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
