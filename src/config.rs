use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MODEL_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL_NAME: &str = "gpt-4o";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    #[default]
    Lenient,
    Strict,
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown match policy {other:?}, expected lenient or strict")),
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lenient => write!(f, "lenient"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    pub model_api_url: String,
    pub model_api_key: String,
    pub model_name: String,
    /// Unset means the model call runs without a deadline of our own.
    pub model_timeout: Option<Duration>,
    pub match_policy: MatchPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            model_api_url: DEFAULT_MODEL_API_URL.to_string(),
            model_api_key: String::new(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_timeout: None,
            match_policy: MatchPolicy::Lenient,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let model_api_key = env::var("MODEL_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .unwrap_or_default();

        let model_timeout = env::var("MODEL_TIMEOUT_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis);

        let match_policy = match env::var("MATCH_POLICY") {
            Ok(value) => value.parse().unwrap_or_else(|err: String| {
                tracing::warn!(error = %err, "falling back to lenient match policy");
                MatchPolicy::Lenient
            }),
            Err(_) => defaults.match_policy,
        };

        Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port,
            model_api_url: env::var("MODEL_API_URL").unwrap_or(defaults.model_api_url),
            model_api_key,
            model_name: env::var("MODEL_NAME").unwrap_or(defaults.model_name),
            model_timeout,
            match_policy,
        }
    }
}
