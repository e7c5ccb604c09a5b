use reqwest::StatusCode;
use thiserror::Error;

/// Failure while calling the upstream completion service.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status. `body` is kept for logging
    /// and is not meant to be returned to clients.
    #[error("upstream returned {status}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

impl CompletionError {
    /// Short machine-readable category used in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Request(_) => "request",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status(),
            Self::Decode(_) => None,
        }
    }
}

/// Failure while posting a prompt to the proxy.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("request to proxy failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("proxy returned {0}")]
    Status(StatusCode),

    #[error("failed to decode proxy response: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing upstream API key: set {0} or `openai_api_key` in the config file")]
    MissingApiKey(&'static str),

    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}
