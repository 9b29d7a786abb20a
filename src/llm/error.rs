//! Error types for the chat engines

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Connection failures and non-2xx responses
    #[error("HTTP error (status {status}): {body}")]
    HttpError { status: u16, body: String },

    /// JSON encoding/decoding issues
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The response parsed but lacked the reply text
    #[error("Malformed response: missing {0}")]
    MissingField(&'static str),
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return LlmError::SerializationError(err.to_string());
        }
        LlmError::HttpError {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            body: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = LlmError::HttpError {
            status: 503,
            body: "model not loaded".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("model not loaded"));
    }

    #[test]
    fn test_from_serde_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let llm_err: LlmError = json_err.into();
        assert!(matches!(llm_err, LlmError::SerializationError(_)));
    }

    #[test]
    fn test_missing_field_names_path() {
        let err = LlmError::MissingField("message.content");
        assert_eq!(err.to_string(), "Malformed response: missing message.content");
    }
}
