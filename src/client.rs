use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::api::{AnalyzeRequest, AnimalMatch, ErrorResponse, UserInfo};
use crate::image;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to read image {}: {source}", path.display())]
    ReadImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request to analysis endpoint failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("analysis endpoint returned {status}: {message}")]
    Server { status: u16, message: String },
}

pub fn encode_data_url(path: &Path) -> Result<String, ClientError> {
    let bytes = std::fs::read(path).map_err(|source| ClientError::ReadImage {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image::encode_data_url(&bytes, image::mime_for_path(path)))
}

#[derive(Debug, Default)]
pub struct ClientSession {
    image: Option<String>,
    user_info: UserInfo,
    analyzing: bool,
    result: Option<AnimalMatch>,
}

impl ClientSession {
    pub fn new(user_info: UserInfo) -> Self {
        Self {
            user_info,
            ..Self::default()
        }
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn user_info(&self) -> &UserInfo {
        &self.user_info
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn result(&self) -> Option<&AnimalMatch> {
        self.result.as_ref()
    }

    pub fn select_image(&mut self, data_url: String) {
        self.image = Some(data_url);
        self.result = None;
    }

    /// Mark the session busy and build the request, unless there is no
    /// image or a request is already in flight.
    pub fn begin_analysis(&mut self) -> Option<AnalyzeRequest> {
        if self.analyzing {
            return None;
        }
        let image = self.image.clone()?;
        self.analyzing = true;
        Some(AnalyzeRequest {
            image: Some(image),
            user_info: Some(self.user_info.clone()),
        })
    }

    pub fn finish_analysis(&mut self, outcome: Option<AnimalMatch>) {
        self.analyzing = false;
        if outcome.is_some() {
            self.result = outcome;
        }
    }

    // Does not cancel a request already in flight.
    pub fn reset(&mut self) {
        self.image = None;
        self.result = None;
    }
}

pub struct AnalyzeClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AnalyzeClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/api/analyze", base_url.trim_end_matches('/')),
        }
    }

    // The server may pass through an incomplete record.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnimalMatch, ClientError> {
        debug!(endpoint = %self.endpoint, "submitting selfie");
        let response = self.http.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        Ok(match_from_value(&body))
    }
}

pub fn match_from_value(body: &Value) -> AnimalMatch {
    let text = |field: &str| match &body[field] {
        Value::String(value) => value.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    let confidence = match &body["confidence"] {
        Value::Number(number) => number.as_f64(),
        Value::String(value) => value.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    }
    .map(|value| value.round().clamp(0.0, 100.0) as u32)
    .unwrap_or(0);

    AnimalMatch {
        animal: text("animal"),
        confidence,
        description: text("description"),
        emoji: text("emoji"),
    }
}

pub fn render_result_card(user: &UserInfo, found: &AnimalMatch) -> String {
    let mut card = String::new();

    if let Some(name) = user.name() {
        card.push_str(name);
        if let Some(age) = user.age() {
            card.push_str(&format!(", {age} years old"));
        }
        if let Some(country) = user.country() {
            card.push_str(&format!(" from {country}"));
        }
        card.push_str("\n\n");
    }

    card.push_str(&format!(
        "{}\nYou're a {}!\n{}% match\n{}",
        found.emoji, found.animal, found.confidence, found.description
    ));
    card
}
