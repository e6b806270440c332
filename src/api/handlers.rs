use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::{analysis, AppState};

use super::models::{AnalyzeRequest, ErrorResponse};

const INDEX_HTML: &str = include_str!("../../static/index.html");

// The body is parsed as JSON whatever its Content-Type says.
pub async fn analyze(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let payload: AnalyzeRequest = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            error!(error = %err, "unreadable analyze request");
            return analysis_failed();
        }
    };

    let Some(image) = payload.image.as_deref().filter(|image| !image.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("No image provided")),
        )
            .into_response();
    };

    info!(
        image_len = image.len(),
        has_user_info = payload.user_info.is_some(),
        "analyzing selfie"
    );

    match analysis::analyze(
        &state.model,
        state.match_policy,
        image,
        payload.user_info.as_ref(),
    )
    .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => {
            error!(error = %err, "failed to analyze image");
            analysis_failed()
        }
    }
}

fn analysis_failed() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Failed to analyze image")),
    )
        .into_response()
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found"))).into_response()
}
