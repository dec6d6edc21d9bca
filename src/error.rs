//! Error handling for the analysis pipeline
//!
//! All failure shapes from the transport, the API, and response parsing
//! are normalized into [`AnalysisError`] so callers deal with exactly one
//! error type. `Display` strings double as the user-facing messages
//! published in session snapshots.

use thiserror::Error;

/// Classified failure for a single analysis request.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Input was empty or whitespace-only; detected before any remote call.
    #[error("The provided input is empty.")]
    EmptyInput,

    /// No API key was configured for the client.
    #[error("missing Gemini API key (set GEMINI_API_KEY)")]
    MissingApiKey,

    /// Transport-level failure: connection, TLS, or timeout.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status. The message carries
    /// the status and response body verbatim.
    #[error("{0}")]
    Api(String),

    /// The response body could not be deserialized.
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    /// The response deserialized but is structurally unusable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Fallback for failure shapes we do not recognize.
    #[error("An unexpected error occurred.")]
    Unexpected,
}

/// Result alias used throughout the crate.
pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_message_is_user_facing() {
        assert_eq!(
            AnalysisError::EmptyInput.to_string(),
            "The provided input is empty."
        );
    }

    #[test]
    fn api_error_surfaces_message_verbatim() {
        let err = AnalysisError::Api("HTTP 503: Service Unavailable".to_string());
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
    }

    #[test]
    fn unexpected_has_generic_message() {
        assert_eq!(
            AnalysisError::Unexpected.to_string(),
            "An unexpected error occurred."
        );
    }

}
