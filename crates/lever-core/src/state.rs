//! UI-agnostic chat state types
//!
//! The message model shared by every front-end. Nothing in here depends on a
//! particular UI framework.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, session-unique identifier of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Ai,
}

impl Author {
    pub fn display_name(&self) -> &'static str {
        match self {
            Author::User => "You",
            Author::Ai => "Lever AI",
        }
    }
}

/// A chat message in the thread.
///
/// Messages in history are never mutated; the draft is the only message whose
/// text changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author: Author,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            author: Author::User,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            author: Author::Ai,
            text: text.into(),
        }
    }

    /// A fresh, empty user draft
    pub fn draft() -> Self {
        Self::user(String::new())
    }
}
