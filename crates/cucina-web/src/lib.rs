//! Cucina Web Server
//!
//! Axum-based server for the live dashboard channel: WebSocket fan-out of
//! per-tick metrics snapshots, plus the inbound control-command plane.

pub mod broadcast;
pub mod dispatch;
pub mod registry;
pub mod routes;
pub mod state;
pub mod websocket;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use broadcast::BroadcastConfig;
use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::dashboard::index))
        .route("/ws", get(websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server and its broadcast loop until the server exits.
pub async fn run_server(
    state: AppState,
    host: &str,
    port: u16,
    config: BroadcastConfig,
) -> anyhow::Result<()> {
    let app = create_router(state.clone());
    let broadcaster = tokio::spawn(broadcast::run_broadcast_loop(state, config));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Dashboard server listening on http://{}:{}", host, port);

    let result = axum::serve(listener, app).await;
    broadcaster.abort();
    result?;
    Ok(())
}
