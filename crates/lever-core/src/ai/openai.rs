use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Candidate, CompletionClient, GenerationConfig};
use crate::error::CompletionError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const COMPLETIONS_PATH: &str = "/v1/completions";

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    #[serde(flatten)]
    config: &'a GenerationConfig,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<Candidate>,
}

/// Client for the OpenAI legacy completions endpoint.
///
/// Built once at startup and shared read-only between requests.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    url: String,
    config: GenerationConfig,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            url: format!("{}{COMPLETIONS_PATH}", base_url.trim_end_matches('/')),
            config: GenerationConfig::default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(&self, prompt: &str) -> Result<Vec<Candidate>, CompletionError> {
        let request = OpenAIRequest {
            config: &self.config,
            prompt,
        };

        debug!(url = %self.url, model = self.config.model, "sending completion request");

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("OpenAI API returned {status}: {body}");
            return Err(CompletionError::Status { status, body });
        }

        let parsed: OpenAIResponse =
            serde_json::from_str(&body).map_err(|e| CompletionError::Decode(e.to_string()))?;

        debug!(candidates = parsed.choices.len(), "completion received");
        Ok(parsed.choices)
    }
}
