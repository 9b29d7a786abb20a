use std::str::FromStr;
use std::sync::Arc;

use super::cloud::CloudEngine;
use super::local::LocalEngine;
use super::ChatEngine;
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmBackend {
    /// Local server when it answers the liveness probe, else the first cloud
    /// provider with an API key.
    #[default]
    Auto,
    Local,
    OpenAi,
    Groq,
}

impl FromStr for LlmBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "local" | "ollama" => Ok(Self::Local),
            "openai" => Ok(Self::OpenAi),
            "groq" => Ok(Self::Groq),
            other => Err(format!("Unknown LLM backend: {}", other)),
        }
    }
}

/// Every chat engine, built once at startup and shared through `AppState`.
#[derive(Clone)]
pub struct Engines {
    pub backend: LlmBackend,
    pub local: Arc<LocalEngine>,
    pub openai: Arc<CloudEngine>,
    pub groq: Arc<CloudEngine>,
}

impl Engines {
    pub fn from_config(config: &Config) -> Self {
        Self {
            backend: config.llm_backend,
            local: Arc::new(LocalEngine::new(
                &config.ollama_url,
                &config.ollama_model,
                config.prompt.clone(),
            )),
            openai: Arc::new(CloudEngine::openai(
                &config.openai_api_key,
                config.openai_organization.clone(),
            )),
            groq: Arc::new(CloudEngine::groq(&config.groq_api_key)),
        }
    }

    /// Pick the engine for one request.
    pub async fn select(&self) -> Arc<dyn ChatEngine> {
        match self.backend {
            LlmBackend::Local => self.local.clone(),
            LlmBackend::OpenAi => self.openai.clone(),
            LlmBackend::Groq => self.groq.clone(),
            LlmBackend::Auto => {
                if self.local.check_status().await {
                    self.local.clone()
                } else if self.openai.has_api_key() {
                    tracing::info!("Local model server unavailable, using OpenAI");
                    self.openai.clone()
                } else if self.groq.has_api_key() {
                    tracing::info!("Local model server unavailable, using Groq");
                    self.groq.clone()
                } else {
                    tracing::warn!("No chat engine available, falling back to local");
                    self.local.clone()
                }
            }
        }
    }
}
