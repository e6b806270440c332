mod handlers;
mod models;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub use handlers::{analyze, index, not_found};
pub use models::{AnalyzeRequest, AnimalMatch, ErrorResponse, UserInfo};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/analyze", post(analyze))
        .fallback(not_found)
        .with_state(state)
}
