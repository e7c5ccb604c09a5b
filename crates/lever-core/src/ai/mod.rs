pub mod openai;

pub use openai::OpenAIClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::NO_RESPONSE_TEXT;
use crate::error::CompletionError;

/// One generated completion returned by the upstream service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// `None` when the service sent `null` or omitted the field.
    #[serde(default)]
    pub text: Option<String>,
}

/// Generation parameters sent with every upstream request.
///
/// These are fixed for the deployment; callers only supply the prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationConfig {
    pub model: &'static str,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "text-davinci-003",
            temperature: 0.7,
            max_tokens: 1000,
            top_p: 1.0,
            frequency_penalty: 0.5,
            presence_penalty: 0.0,
        }
    }
}

/// A text-completion backend.
///
/// The proxy only depends on this trait, so the upstream vendor and transport
/// can be swapped (or faked in tests) without touching request handling.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `prompt` upstream and return the candidate completions in the
    /// order the service produced them.
    async fn complete(&self, prompt: &str) -> Result<Vec<Candidate>, CompletionError>;
}

/// Text of the first candidate, or the placeholder when there is none or it
/// has no text.
pub fn reply_text(candidates: &[Candidate]) -> String {
    candidates
        .first()
        .and_then(|c| c.text.as_deref())
        .filter(|text| !text.is_empty())
        .unwrap_or(NO_RESPONSE_TEXT)
        .to_string()
}
