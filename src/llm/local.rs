//! Local model server (Ollama) engine.
//!
//! Picks one of three prompt modes from the shape of the user's message,
//! sends a single non-streamed chat request and reformats the reply so list
//! items always sit on their own paragraph.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::error::LlmError;
use super::{ChatEngine, ChatMessage, Role};

pub const DEFAULT_GREETING_KEYWORDS: &[&str] =
    &["hi", "hello", "hey", "greetings", "sup", "morning", "evening"];

const BASE_SYSTEM_PROMPT: &str = "You are a compassionate mental health assistant named 'MindMate'. \
Your goal is to provide empathetic listening and verified information. \
IMPORTANT: You are NOT a doctor. If a user mentions self-harm, \
provide Indian helpline numbers (Tele-MANAS: 14416). ";

const GREETING_INSTRUCTION: &str = "\nCONTEXT: The user sent a simple greeting. \
INSTRUCTION: Reply with a warm, short welcome (max 15 words). ";

const EMPATHY_INSTRUCTION: &str = "\nCONTEXT: The user gave a short emotional response. \
INSTRUCTION: Validate their feeling immediately. ";

const ADVICE_INSTRUCTION: &str = "\nINSTRUCTION: Provide a structured list. \
Use numbered lists (1., 2., 3.). \
Add a BLANK LINE between items.";

// One-shot example that steers small models toward numbered lists.
const ADVICE_EXAMPLE_QUESTION: &str = "How can I sleep better?";
const ADVICE_EXAMPLE_ANSWER: &str = "Here are tips for better sleep:\n\n\
1. Schedule: Sleep at the same time daily.\n\n\
2. No Screens: Avoid phones before bed.\n\n\
3. Relax: Try meditation.";

static NUMBERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(\d+\.)").expect("numbered marker pattern"));
static BULLET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)([\-\*]\s)").expect("bullet marker pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    Greeting,
    Empathy,
    Advice,
}

/// Tunables for mode selection and sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptConfig {
    /// Matched as substrings of the lowercased message.
    pub greeting_keywords: Vec<String>,
    /// Greeting mode applies below this many words.
    pub greeting_max_words: usize,
    /// Empathy mode applies below this many words.
    pub empathy_max_words: usize,
    pub temperature: f32,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            greeting_keywords: DEFAULT_GREETING_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            greeting_max_words: 5,
            empathy_max_words: 8,
            temperature: 0.3,
        }
    }
}

impl PromptConfig {
    pub fn classify(&self, query: &str) -> ChatMode {
        let clean = query.trim().to_lowercase();
        let word_count = clean.split_whitespace().count();
        let is_greeting = self
            .greeting_keywords
            .iter()
            .any(|keyword| clean.contains(keyword.as_str()));

        if word_count < self.greeting_max_words && is_greeting {
            ChatMode::Greeting
        } else if word_count < self.empathy_max_words && !is_greeting {
            ChatMode::Empathy
        } else {
            ChatMode::Advice
        }
    }

    /// Assemble the full message sequence for one user query.
    pub fn build_messages(&self, query: &str, context: Option<&[String]>) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(4);

        match self.classify(query) {
            ChatMode::Greeting => {
                messages.push(ChatMessage::system(format!(
                    "{BASE_SYSTEM_PROMPT}{GREETING_INSTRUCTION}"
                )));
            }
            ChatMode::Empathy => {
                messages.push(ChatMessage::system(format!(
                    "{BASE_SYSTEM_PROMPT}{EMPATHY_INSTRUCTION}"
                )));
            }
            ChatMode::Advice => {
                messages.push(ChatMessage::system(format!(
                    "{BASE_SYSTEM_PROMPT}{ADVICE_INSTRUCTION}"
                )));
                messages.push(ChatMessage::user(ADVICE_EXAMPLE_QUESTION));
                messages.push(ChatMessage::assistant(ADVICE_EXAMPLE_ANSWER));
            }
        }

        messages.push(ChatMessage::user(with_context(query, context)));
        messages
    }
}

/// Wrap the question in retrieved passages, or pass it through untouched.
pub fn with_context(query: &str, context: Option<&[String]>) -> String {
    match context {
        Some(chunks) if !chunks.is_empty() => format!(
            "Context:\n---\n{}\n---\nQuestion: {}",
            chunks.join("\n\n"),
            query
        ),
        _ => query.to_string(),
    }
}

/// Strips bold markers and forces a blank line before every numbered or
/// bulleted marker that follows whitespace or starts the text.
///
/// Decimal numbers after whitespace are split too ("pi is 3.14" becomes
/// "pi is\n\n3.14"). Clients render the current output, so keep it.
pub fn beautify_response(text: &str) -> String {
    let text = text.replace("**", "");
    let text = NUMBERED_MARKER.replace_all(&text, "\n\n${1}");
    let text = BULLET_MARKER.replace_all(&text, "\n\n${1}");
    text.trim().to_string()
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    temperature: f32,
}

pub struct LocalEngine {
    client: Client,
    base_url: String,
    model: String,
    prompt: PromptConfig,
}

impl LocalEngine {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, prompt: PromptConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            prompt,
        }
    }

    /// Liveness probe against the tags listing. Any failure reads as down.
    pub async fn check_status(&self) -> bool {
        match self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                tracing::debug!(error = %e, url = %self.base_url, "Local model server unreachable");
                false
            }
        }
    }

    pub async fn generate_response(&self, query: &str, context: Option<&[String]>) -> String {
        let messages = self.prompt.build_messages(query, context);
        tracing::debug!(
            model = %self.model,
            mode = ?self.prompt.classify(query),
            turns = messages.len(),
            "Sending request to local model server"
        );

        match self.request_reply(&messages).await {
            Ok(reply) => beautify_response(&reply),
            Err(e) => {
                tracing::warn!(error = %e, "Local model request failed");
                format!("Error: {}", e)
            }
        }
    }

    async fn request_reply(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let payload = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            temperature: self.prompt.temperature,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = serde_json::from_slice(&response.bytes().await?)?;
        body["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or(LlmError::MissingField("message.content"))
    }
}

#[async_trait]
impl ChatEngine for LocalEngine {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn reply(&self, history: &[ChatMessage], context: Option<&[String]>) -> String {
        let query = history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        self.generate_response(query, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::test_support::{spawn_stub, UNREACHABLE_URL};
    use axum::{routing::{get, post}, Json, Router};
    use axum::http::StatusCode;
    use serde_json::json;

    fn system_content(messages: &[ChatMessage]) -> &str {
        assert_eq!(messages[0].role, Role::System);
        &messages[0].content
    }

    // ── mode selection ───────────────────────────────────────────────────

    #[test]
    fn test_short_greeting_selects_greeting_mode() {
        let prompt = PromptConfig::default();
        let messages = prompt.build_messages("Hello there", None);

        assert_eq!(prompt.classify("Hello there"), ChatMode::Greeting);
        assert_eq!(messages.len(), 2);
        assert!(system_content(&messages).starts_with(BASE_SYSTEM_PROMPT));
        assert!(system_content(&messages).contains("simple greeting"));
        assert!(system_content(&messages).contains("Tele-MANAS: 14416"));
    }

    #[test]
    fn test_short_message_without_greeting_selects_empathy_mode() {
        let prompt = PromptConfig::default();
        let messages = prompt.build_messages("I feel so lonely", None);

        assert_eq!(prompt.classify("I feel so lonely"), ChatMode::Empathy);
        assert_eq!(messages.len(), 2);
        assert!(system_content(&messages).contains("short emotional response"));
        assert!(!system_content(&messages).contains("simple greeting"));
    }

    #[test]
    fn test_long_message_selects_advice_mode_with_example() {
        let prompt = PromptConfig::default();
        let query = "What can I do when I cannot stop worrying about exams";
        let messages = prompt.build_messages(query, None);

        assert_eq!(prompt.classify(query), ChatMode::Advice);
        assert_eq!(messages.len(), 4);
        assert!(system_content(&messages).contains("Provide a structured list"));
        assert_eq!(messages[1], ChatMessage::user("How can I sleep better?"));
        assert_eq!(messages[2].role, Role::Assistant);
        assert!(messages[2].content.contains("1. Schedule"));
        assert_eq!(messages[3], ChatMessage::user(query));
    }

    #[test]
    fn test_greeting_keyword_matches_inside_words() {
        // "this" contains "hi"
        let prompt = PromptConfig::default();
        assert_eq!(prompt.classify("this is hard"), ChatMode::Greeting);
    }

    #[test]
    fn test_mid_length_greeting_falls_through_to_advice() {
        let prompt = PromptConfig::default();
        assert_eq!(prompt.classify("hey how are you doing today"), ChatMode::Advice);
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let prompt = PromptConfig {
            empathy_max_words: 3,
            ..PromptConfig::default()
        };
        assert_eq!(prompt.classify("I feel so lonely"), ChatMode::Advice);
    }

    // ── RAG context ──────────────────────────────────────────────────────

    #[test]
    fn test_context_wraps_question() {
        let chunks = vec!["A".to_string(), "B".to_string()];
        assert_eq!(
            with_context("Q?", Some(&chunks)),
            "Context:\n---\nA\n\nB\n---\nQuestion: Q?"
        );
    }

    #[test]
    fn test_empty_context_leaves_question_unchanged() {
        assert_eq!(with_context("Q?", Some(&[])), "Q?");
        assert_eq!(with_context("Q?", None), "Q?");
    }

    #[test]
    fn test_context_lands_in_final_user_turn() {
        let prompt = PromptConfig::default();
        let chunks = vec!["A".to_string(), "B".to_string()];
        let messages = prompt.build_messages("Q?", Some(&chunks));
        let last = messages.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "Context:\n---\nA\n\nB\n---\nQuestion: Q?");
    }

    // ── cleanup pass ─────────────────────────────────────────────────────

    #[test]
    fn test_beautify_splits_numbered_list() {
        assert_eq!(
            beautify_response("**Hello** 1. first 2. second"),
            "Hello\n\n1. first\n\n2. second"
        );
    }

    #[test]
    fn test_beautify_splits_bullets() {
        assert_eq!(
            beautify_response("Tips: - rest * water"),
            "Tips:\n\n- rest\n\n* water"
        );
    }

    #[test]
    fn test_beautify_marker_at_start_is_trimmed() {
        assert_eq!(beautify_response("1. breathe"), "1. breathe");
    }

    #[test]
    fn test_beautify_idempotent_without_markers() {
        let text = "  You are doing well, take it slow.  ";
        let once = beautify_response(text);
        assert_eq!(beautify_response(&once), once);
        assert_eq!(once, "You are doing well, take it slow.");
    }

    #[test]
    fn test_beautify_splits_decimal_numbers() {
        // Known over-match: decimals after whitespace are treated as list markers.
        assert_eq!(beautify_response("pi is 3.14"), "pi is\n\n3.14");
        assert_eq!(beautify_response("v3.14"), "v3.14");
    }

    // ── HTTP ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_check_status_unreachable_is_false() {
        let engine = LocalEngine::new(UNREACHABLE_URL, "qwen-test", PromptConfig::default());
        assert!(!engine.check_status().await);
    }

    #[tokio::test]
    async fn test_check_status_requires_200() {
        let up = spawn_stub(Router::new().route("/api/tags", get(|| async { Json(json!({"models": []})) }))).await;
        let down = spawn_stub(Router::new().route(
            "/api/tags",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;

        assert!(LocalEngine::new(up, "m", PromptConfig::default()).check_status().await);
        assert!(!LocalEngine::new(down, "m", PromptConfig::default()).check_status().await);
    }

    #[tokio::test]
    async fn test_generate_response_sends_payload_and_cleans_reply() {
        let router = Router::new().route(
            "/api/chat",
            post(|Json(body): Json<Value>| async move {
                let well_formed = body["model"] == "qwen-test"
                    && body["stream"] == false
                    && (body["temperature"].as_f64().unwrap_or(0.0) - 0.3).abs() < 1e-6
                    && body["messages"][0]["role"] == "system";
                if !well_formed {
                    return Err(StatusCode::BAD_REQUEST);
                }
                Ok(Json(json!({
                    "message": { "role": "assistant", "content": "**Sure** 1. rest 2. talk" }
                })))
            }),
        );
        let base = spawn_stub(router).await;
        let engine = LocalEngine::new(base, "qwen-test", PromptConfig::default());

        let reply = engine.generate_response("I am sad", None).await;
        assert_eq!(reply, "Sure\n\n1. rest\n\n2. talk");
    }

    #[tokio::test]
    async fn test_generate_response_reports_http_status() {
        let router = Router::new().route(
            "/api/chat",
            post(|| async { (StatusCode::NOT_FOUND, "model not found") }),
        );
        let base = spawn_stub(router).await;
        let engine = LocalEngine::new(base, "missing", PromptConfig::default());

        let reply = engine.generate_response("hello", None).await;
        assert!(reply.starts_with("Error: "), "got {reply}");
        assert!(reply.contains("404"));
    }

    #[tokio::test]
    async fn test_generate_response_reports_malformed_body() {
        let router = Router::new().route("/api/chat", post(|| async { Json(json!({"done": true})) }));
        let base = spawn_stub(router).await;
        let engine = LocalEngine::new(base, "m", PromptConfig::default());

        let reply = engine.generate_response("hello", None).await;
        assert_eq!(reply, "Error: Malformed response: missing message.content");
    }

    #[tokio::test]
    async fn test_generate_response_reports_non_json_body() {
        let router = Router::new().route("/api/chat", post(|| async { "<html>proxy</html>" }));
        let base = spawn_stub(router).await;
        let engine = LocalEngine::new(base, "m", PromptConfig::default());

        let reply = engine.generate_response("hello", None).await;
        assert!(reply.starts_with("Error: Serialization error: "), "got {reply}");
    }

    #[tokio::test]
    async fn test_transport_failure_returns_error_string() {
        let engine = LocalEngine::new(UNREACHABLE_URL, "m", PromptConfig::default());
        let reply = engine.reply(&[ChatMessage::user("hi")], None).await;
        assert!(reply.starts_with("Error: "));
    }
}
