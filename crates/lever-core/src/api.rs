//! Wire types for the `/api/message` endpoint shared by the proxy and its clients.

use serde::{Deserialize, Serialize};

pub const MESSAGE_PATH: &str = "/api/message";

/// Text returned with 200 when upstream produced no usable candidate.
pub const NO_RESPONSE_TEXT: &str = "No response from GPT-3";

/// Body of the 405 response.
pub const ONLY_POST_MESSAGE: &str = "Only POST requests allowed";

/// Text of the AI message appended when a send fails.
pub const FALLBACK_REPLY: &str = "Something went wrong";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodNotAllowedResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Sanitized error representation: category, display message, and the
/// upstream HTTP status when there was one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&crate::CompletionError> for ErrorDetail {
    fn from(err: &crate::CompletionError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
        }
    }
}
