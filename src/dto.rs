//! # MindMate — Request/Response DTOs
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body or query params
//! - `*Response` → serialized to client JSON
//! - Validation is expressed via `validator` derive macros; handlers call
//!   `.validate()?` before touching the database

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::llm::{ChatMessage, Role};
use crate::models::assessment::AssessmentResult;

// ============================================================================
// Users
// ============================================================================

/// Emails are stored and looked up trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// POST /register
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 120, message = "Email too long"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// POST /login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ============================================================================
// Journal
// ============================================================================

/// POST /mood
#[derive(Debug, Deserialize, Validate)]
pub struct MoodRequest {
    pub email: String,
    #[validate(length(min = 1, max = 50, message = "Mood must be 1-50 characters"))]
    pub mood: String,
    /// Empty or whitespace-only notes are stored as NULL.
    pub note: Option<String>,
    pub entry_date: Option<NaiveDate>,
}

impl MoodRequest {
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// GET /mood?email=
#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    pub email: String,
}

/// POST /activity
#[derive(Debug, Deserialize, Validate)]
pub struct ActivityRequest {
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "Activity must be 1-100 characters"))]
    pub activity: String,
}

// ============================================================================
// Assessments
// ============================================================================

/// Answers use a 0-3 frequency scale ("not at all" .. "nearly every day").
pub const MAX_ANSWER_SCORE: i32 = 3;

/// POST /assessment/:assessment_type
#[derive(Debug, Deserialize, Validate)]
pub struct AssessmentRequest {
    pub email: String,
    /// The web client sends each answer as a string (`"2"`); bare numbers
    /// are accepted too.
    #[serde(deserialize_with = "deserialize_answers")]
    #[validate(custom = "validate_answers")]
    pub answers: BTreeMap<String, i32>,
}

impl AssessmentRequest {
    pub fn score(&self) -> i32 {
        self.answers.values().sum()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnswerValue {
    Score(i32),
    Text(String),
}

fn deserialize_answers<'de, D>(deserializer: D) -> Result<BTreeMap<String, i32>, D::Error>
where
    D: Deserializer<'de>,
{
    BTreeMap::<String, AnswerValue>::deserialize(deserializer)?
        .into_iter()
        .map(|(question, value)| {
            let score = match value {
                AnswerValue::Score(n) => n,
                AnswerValue::Text(text) => text.trim().parse::<i32>().map_err(|_| {
                    <D::Error as de::Error>::custom(format!(
                        "answer {} is not a number: {:?}",
                        question, text
                    ))
                })?,
            };
            Ok((question, score))
        })
        .collect()
}

fn validate_answers(answers: &BTreeMap<String, i32>) -> Result<(), ValidationError> {
    if answers.is_empty() {
        return Err(ValidationError::new("answers_required"));
    }
    if answers.values().any(|v| !(0..=MAX_ANSWER_SCORE).contains(v)) {
        return Err(ValidationError::new("answer_out_of_range"));
    }
    Ok(())
}

/// GET /assessment/questions/:assessment_type
#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub assessment: String,
    pub questions: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    pub result: String,
    pub score: i32,
    pub assessment: AssessmentResult,
}

// ============================================================================
// Chat
// ============================================================================

/// POST /chat
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(custom = "validate_history")]
    pub messages: Vec<ChatMessage>,
    /// Retrieved passages to ground the reply.
    pub context: Option<Vec<String>>,
    /// Sender, when signed in; only used to tag server logs.
    pub email: Option<String>,
}

fn validate_history(messages: &[ChatMessage]) -> Result<(), ValidationError> {
    match messages.iter().rev().find(|m| m.role == Role::User) {
        Some(m) if !m.content.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::new("user_message_required")),
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub engine: &'static str,
}
