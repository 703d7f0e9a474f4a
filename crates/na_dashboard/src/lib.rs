use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, SessionManagerLayer};
use tracing::info;

pub mod client;
pub mod handlers;
pub mod render;
pub mod session;

pub use client::{ApiClient, ClientError};
pub use session::{FeedSessionStore, FeedState};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Sessions idle for longer than this are forgotten.
pub const SESSION_IDLE_MINUTES: i64 = 60;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub bind: SocketAddr,
    pub api_url: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8501)),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct DashboardState {
    pub api: ApiClient,
    pub sessions: FeedSessionStore,
}

impl DashboardState {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            sessions: FeedSessionStore::default(),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self, ClientError> {
        Ok(Self::new(ApiClient::new(&config.api_url)?))
    }
}

pub fn create_dashboard(state: DashboardState) -> Router {
    let sessions = SessionManagerLayer::new(state.sessions.clone())
        .with_name(session::SESSION_COOKIE)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(SESSION_IDLE_MINUTES)));

    Router::new()
        .route("/", get(handlers::index))
        .route("/analyze", post(handlers::analyze))
        .route("/feed", get(handlers::feed))
        .route("/feed/fetch", post(handlers::fetch_feed))
        .route("/feed/clear", post(handlers::clear_feed))
        .route("/feed/:index/analyze", post(handlers::analyze_article))
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub async fn serve(app: Router, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("📊 Dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
