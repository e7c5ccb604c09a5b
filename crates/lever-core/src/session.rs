//! Chat session state machine.
//!
//! `ChatSession` owns the draft, the history and the loading flag. It never
//! touches the network itself: a successful submit hands back a
//! [`PendingSend`], the caller performs the request (see
//! [`crate::ProxyClient::send`]) and feeds the result to
//! [`ChatSession::complete_send`]. This keeps every mutation on the caller's
//! single execution context.

use tracing::{debug, warn};

use crate::api::FALLBACK_REPLY;
use crate::error::SendError;
use crate::state::Message;

/// Keys the session reacts to. Everything that is not a submit is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKey {
    Enter,
    Other,
}

/// A send initiated by a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub text: String,
}

impl PendingSend {
    /// Prompt as posted to the proxy: the submitted text plus a trailing newline.
    pub fn prompt(&self) -> String {
        format!("{}\n", self.text)
    }
}

#[derive(Debug)]
pub struct ChatSession {
    loading: bool,
    draft: Message,
    history: Vec<Message>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            loading: false,
            draft: Message::draft(),
            history: Vec::new(),
        }
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn draft(&self) -> &Message {
        &self.draft
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Replace the draft text. No validation.
    pub fn handle_input_change(&mut self, value: impl Into<String>) {
        self.draft.text = value.into();
    }

    /// Move the draft into history and start a send.
    ///
    /// Returns `None` (and changes nothing) when the draft is empty or a send
    /// is already in flight.
    pub fn handle_submit(&mut self) -> Option<PendingSend> {
        if self.draft.text.is_empty() {
            return None;
        }
        if self.loading {
            debug!("submit ignored while a reply is pending");
            return None;
        }

        self.loading = true;
        let submitted = std::mem::replace(&mut self.draft, Message::draft());
        let pending = PendingSend {
            text: submitted.text.clone(),
        };
        self.history.push(submitted);
        Some(pending)
    }

    pub fn handle_key(&mut self, key: ChatKey) -> Option<PendingSend> {
        match key {
            ChatKey::Enter => self.handle_submit(),
            ChatKey::Other => None,
        }
    }

    /// Record the outcome of a send: exactly one AI message is appended and
    /// loading is cleared, whatever the outcome.
    pub fn complete_send(&mut self, outcome: Result<String, SendError>) {
        let text = match outcome {
            Ok(text) => text,
            Err(e) => {
                warn!("send failed: {e}");
                FALLBACK_REPLY.to_string()
            }
        };
        self.history.push(Message::ai(text));
        self.loading = false;
    }
}
