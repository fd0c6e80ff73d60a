//! Error types for the responder layer

use thiserror::Error;

/// Errors that can occur while generating a reply
///
/// None of these reach the HTTP caller directly: the chat service logs them
/// and substitutes the responder's canned fallback text.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The responder has no model or client to talk to
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// HTTP request failures
    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    /// JSON encoding/decoding issues
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The model answered, but with nothing usable
    #[error("Empty response from model")]
    EmptyResponse,

    /// Generated text was below the minimum useful length
    #[error("Response too short ({len} chars)")]
    ResponseTooShort { len: usize },
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return GenerationError::Serialization(err.to_string());
        }
        GenerationError::Http {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            body: err.to_string(),
        }
    }
}
