//! AI analysis integration
//!
//! Defines the [`AnalysisClient`] contract — raw deal text in, generated
//! memo out — and the Gemini-backed implementation. Everything behind the
//! trait owns the wire format; callers only ever see a [`Memo`] or an
//! [`AnalysisError`](crate::error::AnalysisError).

pub mod gemini;
pub mod prompts;

use async_trait::async_trait;
use std::env;

use crate::error::AnalysisResult;

pub use gemini::GeminiClient;

/// Generated deal memo text. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memo {
    pub text: String,
}

impl Memo {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl std::fmt::Display for Memo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Contract with the remote analysis service: exactly one outbound call
/// per invocation, no retries, no caching. Every failure shape is
/// classified into `AnalysisError` rather than panicking or being
/// swallowed.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, input: &str) -> AnalysisResult<Memo>;
}

/// Default Gemini model, matching the original service configuration.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Client configuration, normally sourced from the environment.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_seconds: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: Some(8192),
            temperature: Some(0.2),
            timeout_seconds: 60,
        }
    }
}

impl AiConfig {
    /// Read configuration from `GEMINI_API_KEY` (falling back to
    /// `API_KEY`) and `GEMINI_MODEL`.
    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .unwrap_or_default();
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self {
            api_key,
            model,
            ..Self::default()
        }
    }
}
