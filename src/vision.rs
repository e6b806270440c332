use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model integration missing: set MODEL_API_KEY or OPENAI_API_KEY")]
    MissingApiKey,
    #[error("model request timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to send model request: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("model request failed ({status}): {body}")]
    Upstream { status: u16, body: String },
    #[error("failed to decode model response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("model returned an empty completion")]
    EmptyCompletion,
}

pub struct ModelClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    timeout: Option<Duration>,
}

impl ModelClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.model_api_url,
            &config.model_api_key,
            &config.model_name,
        )
        .with_timeout(config.model_timeout)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(&self, instruction: &str, image_url: &str) -> Result<String, ModelError> {
        if self.api_key.trim().is_empty() {
            return Err(ModelError::MissingApiKey);
        }

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: instruction },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_url },
                    },
                ],
            }],
        };

        debug!(model = %self.model, url = %self.api_url, "sending completion request");

        let send = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send();

        let response = match self.timeout {
            Some(limit) => timeout(limit, send)
                .await
                .map_err(|_| ModelError::Timeout(limit))?,
            None => send.await,
        }
        .map_err(ModelError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response body>".to_string());
            return Err(ModelError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response.json().await.map_err(ModelError::Decode)?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(ModelError::EmptyCompletion)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}
