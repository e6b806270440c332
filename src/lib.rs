pub mod analysis;
pub mod api;
pub mod client;
pub mod config;
pub mod image;
pub mod prompt;
pub mod vision;

use axum::Router;
use std::sync::Arc;

pub use analysis::{analyze, parse_completion, AnalysisError};
pub use api::{AnalyzeRequest, AnimalMatch, ErrorResponse, UserInfo};
pub use config::{AppConfig, MatchPolicy};
pub use vision::{ModelClient, ModelError};

pub struct AppState {
    pub model: ModelClient,
    pub match_policy: MatchPolicy,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: ModelClient::from_config(config),
            match_policy: config.match_policy,
        }
    }
}

pub fn build_app(state: Arc<AppState>) -> Router {
    api::router(state)
}

pub async fn run_server(app: Router, bind_address: &str, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind((bind_address, port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "animal matcher listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
