//! Chat engines: a local Ollama wrapper and two hosted chat-completion APIs.
//!
//! Every engine answers with plain text. Failures never propagate to the
//! caller; each engine renders them into a user-displayable string.

pub mod cloud;
pub mod engines;
pub mod error;
pub mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[async_trait]
pub trait ChatEngine: Send + Sync {
    /// Short identifier reported back to clients ("local", "openai", "groq").
    fn name(&self) -> &'static str;

    /// Produce a reply for the conversation. Never fails: transport and
    /// payload errors come back as text.
    async fn reply(&self, history: &[ChatMessage], context: Option<&[String]>) -> String;
}

/// Removes markdown bold markers.
pub fn strip_emphasis(text: &str) -> String {
    text.replace("**", "")
}
