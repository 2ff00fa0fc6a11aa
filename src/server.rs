use crate::api;
use crate::backend::BackendHost;
use crate::catalog::CertificateCatalog;
use crate::config::AppConfig;
use crate::page::{ChatPage, SDK_PATH};
use crate::session::SessionManager;
use axum::Router;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub page: Arc<ChatPage>,
    pub sessions: Arc<dyn SessionManager>,
    pub backend: BackendHost,
    pub catalog: Arc<CertificateCatalog>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        page: ChatPage,
        sessions: Arc<dyn SessionManager>,
        backend: BackendHost,
        catalog: CertificateCatalog,
    ) -> Self {
        Self {
            config: Arc::new(config),
            page: Arc::new(page),
            sessions,
            backend,
            catalog: Arc::new(catalog),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let enable_cors = state.config.enable_cors;
    let router = Router::new()
        .route("/", get(api::index))
        .route(SDK_PATH, get(api::serve_sdk))
        .route("/healthz", get(api::healthz))
        .route(
            "/api/session",
            post(api::issue_session).delete(api::end_session),
        )
        .route("/api/sidebar", get(api::get_sidebar))
        .route("/api/relay/state", get(api::get_relay_state))
        .route("/api/relay/click", post(api::post_click))
        .route("/api/relay/select", post(api::post_select))
        .route("/api/relay/preset", post(api::post_preset))
        .route("/api/chat/message", post(api::post_chat_message))
        .route("/actions", get(api::list_actions))
        .route("/webhook", post(api::run_action_webhook))
        .with_state(state)
        .layer(TraceLayer::new_for_http());
    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

pub async fn run(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(?err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
