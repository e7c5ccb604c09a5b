pub mod ai;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::{reply_text, Candidate, CompletionClient, GenerationConfig, OpenAIClient};
pub use client::ProxyClient;
pub use config::Config;
pub use error::{CompletionError, ConfigError, SendError};
pub use session::{ChatKey, ChatSession, PendingSend};
pub use state::{Author, Message, MessageId};
