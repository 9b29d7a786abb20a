//! Hosted chat-completion engines (OpenAI and Groq).
//!
//! Both speak the OpenAI chat-completions wire format, so one client type is
//! parameterized by a provider preset.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::error::LlmError;
use super::{strip_emphasis, ChatEngine, ChatMessage};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudPreset {
    pub name: &'static str,
    pub label: &'static str,
    pub endpoint: &'static str,
    pub model: &'static str,
    /// `None` leaves sampling temperature to the vendor default.
    pub temperature: Option<f32>,
    /// Shown to the user whenever the request fails.
    pub fallback_reply: &'static str,
}

pub const OPENAI: CloudPreset = CloudPreset {
    name: "openai",
    label: "OpenAI",
    endpoint: "https://api.openai.com/v1/chat/completions",
    model: "gpt-4o-mini",
    temperature: None,
    fallback_reply: "I am currently having trouble connecting to the cloud server.",
};

pub const GROQ: CloudPreset = CloudPreset {
    name: "groq",
    label: "Groq (Llama 3)",
    endpoint: "https://api.groq.com/openai/v1/chat/completions",
    model: "llama-3.3-70b-versatile",
    temperature: Some(0.5),
    fallback_reply: "I'm having trouble connecting to the AI server. Please try again.",
};

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

pub struct CloudEngine {
    client: Client,
    preset: CloudPreset,
    endpoint: String,
    api_key: String,
    organization: Option<String>,
}

impl CloudEngine {
    pub fn new(preset: CloudPreset, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            preset,
            endpoint: preset.endpoint.to_string(),
            api_key: api_key.into(),
            organization: None,
        }
    }

    pub fn openai(api_key: impl Into<String>, organization: Option<String>) -> Self {
        Self {
            organization,
            ..Self::new(OPENAI, api_key)
        }
    }

    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::new(GROQ, api_key)
    }

    /// Point the engine at a different chat-completions URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub async fn generate_response_with_history(&self, messages: &[ChatMessage]) -> String {
        tracing::info!(
            provider = self.preset.name,
            model = self.preset.model,
            turns = messages.len(),
            "Sending request to {} with history",
            self.preset.label
        );

        match self.request_reply(messages).await {
            Ok(reply) => strip_emphasis(&reply),
            Err(e) => {
                tracing::error!(provider = self.preset.name, error = %e, "{} error with history", self.preset.label);
                self.preset.fallback_reply.to_string()
            }
        }
    }

    async fn request_reply(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let payload = CompletionRequest {
            model: self.preset.model,
            messages,
            temperature: self.preset.temperature,
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload);
        if let Some(org) = &self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::HttpError { status, body });
        }

        let body: Value = serde_json::from_slice(&response.bytes().await?)?;
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or(LlmError::MissingField("choices[0].message.content"))
    }
}

#[async_trait]
impl ChatEngine for CloudEngine {
    fn name(&self) -> &'static str {
        self.preset.name
    }

    async fn reply(&self, history: &[ChatMessage], _context: Option<&[String]>) -> String {
        self.generate_response_with_history(history).await
    }
}
