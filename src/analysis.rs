use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::api::{AnimalMatch, UserInfo};
use crate::config::MatchPolicy;
use crate::image::{self, ImageError};
use crate::prompt;
use crate::vision::{ModelClient, ModelError};

pub const MIN_CONFIDENCE: u32 = 70;
pub const MAX_CONFIDENCE: u32 = 95;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("model response is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("model response does not match the expected shape: {0}")]
    Shape(#[source] serde_json::Error),
}

pub async fn analyze(
    model: &ModelClient,
    policy: MatchPolicy,
    image: &str,
    user: Option<&UserInfo>,
) -> Result<Value, AnalysisError> {
    let image_url = image::to_image_url(image)?;
    let instruction = prompt::build_instruction(user);

    let text = model.complete(&instruction, &image_url).await?;
    info!(model = model.model(), response = %text, "model response received");

    parse_completion(&text, policy)
}

/// Lenient parsing returns whatever JSON the model produced, unchecked.
pub fn parse_completion(text: &str, policy: MatchPolicy) -> Result<Value, AnalysisError> {
    match policy {
        MatchPolicy::Lenient => serde_json::from_str(text).map_err(AnalysisError::Parse),
        MatchPolicy::Strict => {
            let mut value: Value =
                serde_json::from_str(strip_code_fence(text)).map_err(AnalysisError::Parse)?;
            clamp_confidence(&mut value);
            let found: AnimalMatch =
                serde_json::from_value(value).map_err(AnalysisError::Shape)?;
            serde_json::to_value(found).map_err(AnalysisError::Shape)
        }
    }
}

// Runs before typing, so negative or fractional numbers still clamp.
fn clamp_confidence(value: &mut Value) {
    let Some(field) = value.get_mut("confidence") else {
        return;
    };
    if let Some(confidence) = field.as_f64() {
        let clamped = (confidence.round() as i64)
            .clamp(i64::from(MIN_CONFIDENCE), i64::from(MAX_CONFIDENCE));
        *field = Value::from(clamped);
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // drop the language tag, with or without a newline after it
    body.trim_start_matches(|c: char| c.is_ascii_alphanumeric())
        .trim()
}
