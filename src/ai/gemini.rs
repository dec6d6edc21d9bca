//! Google Gemini API client
//!
//! Implements [`AnalysisClient`] over the Gemini `generateContent`
//! endpoint. One outbound call per `analyze` invocation; transport,
//! status, and parse failures are normalized into
//! [`AnalysisError`](crate::error::AnalysisError).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{prompts, AiConfig, AnalysisClient, Memo};
use crate::context::{self, DealDataSource};
use crate::error::{AnalysisError, AnalysisResult};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Memo returned when no street address can be extracted from the input.
/// Matches the original service: a guidance message, not a failure.
const NO_ADDRESS_MEMO: &str = "Could not identify a property address from your input. \
     Please provide a clear address to analyze.";

/// Gemini-backed analysis client.
pub struct GeminiClient {
    config: AiConfig,
    client: Client,
    base_url: String,
    deal_source: Arc<dyn DealDataSource>,
}

/// Gemini API request format
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata", default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiUsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: Option<u32>,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: Option<u32>,
    #[serde(rename = "totalTokenCount", default)]
    total_token_count: Option<u32>,
}

impl GeminiClient {
    /// Create a new Gemini client over the given deal-data source.
    pub fn new(config: AiConfig, deal_source: Arc<dyn DealDataSource>) -> AnalysisResult<Self> {
        if config.api_key.is_empty() {
            return Err(AnalysisError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(AnalysisError::Http)?;

        Ok(Self {
            config,
            client,
            base_url: GEMINI_BASE_URL.to_string(),
            deal_source,
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send one `generateContent` request and return the raw memo text.
    async fn send_request(&self, prompt: String) -> AnalysisResult<String> {
        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            }),
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.config.model, self.config.api_key
        );

        debug!(model = %self.config.model, "sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(AnalysisError::Http)?;

        let status = response.status();
        let response_text = response.text().await.map_err(AnalysisError::Http)?;

        debug!(%status, "Gemini API response received");

        if !status.is_success() {
            error!(%status, body = %response_text, "Gemini API error");
            return Err(AnalysisError::Api(format!(
                "HTTP {}: {}",
                status, response_text
            )));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = %e, "failed to parse Gemini response");
                AnalysisError::Json(e)
            })?;

        if let Some(usage) = &gemini_response.usage_metadata {
            info!(
                prompt_tokens = ?usage.prompt_token_count,
                response_tokens = ?usage.candidates_token_count,
                total_tokens = ?usage.total_token_count,
                "Gemini API usage"
            );
        }

        extract_memo_text(gemini_response)
    }
}

/// Pull the first candidate's first part out of a parsed response.
fn extract_memo_text(response: GeminiResponse) -> AnalysisResult<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AnalysisError::InvalidResponse("no candidates in response".to_string()))?;

    let part = candidate
        .content
        .parts
        .into_iter()
        .next()
        .ok_or_else(|| AnalysisError::InvalidResponse("no parts in candidate".to_string()))?;

    Ok(part.text)
}

#[async_trait::async_trait]
impl AnalysisClient for GeminiClient {
    async fn analyze(&self, input: &str) -> AnalysisResult<Memo> {
        let address = context::extract_address(input);
        info!(address = ?address, "analyzing deal text");

        let Some(address) = address else {
            return Ok(Memo::new(NO_ADDRESS_MEMO));
        };

        let deal_context =
            context::build_deal_context(self.deal_source.as_ref(), Some(&address)).await;
        let prompt = prompts::build_memo_prompt(input, &deal_context);

        let memo_text = self.send_request(prompt).await?;

        info!(memo_chars = memo_text.len(), "deal memo generated");
        Ok(Memo::new(memo_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InMemoryDealStore;

    fn test_config() -> AiConfig {
        AiConfig {
            api_key: "test-key".to_string(),
            ..AiConfig::default()
        }
    }

    fn test_client() -> GeminiClient {
        GeminiClient::new(test_config(), Arc::new(InMemoryDealStore::with_sample_data()))
            .expect("client builds")
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let config = AiConfig::default();
        let result = GeminiClient::new(config, Arc::new(InMemoryDealStore::new()));
        assert!(matches!(result, Err(AnalysisError::MissingApiKey)));
    }

    #[test]
    fn response_parsing_happy_path() {
        let raw = r###"{
            "candidates": [
                {"content": {"parts": [{"text": "## Executive Summary\nSolid deal."}]}}
            ],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
        }"###;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        let text = extract_memo_text(parsed).unwrap();
        assert_eq!(text, "## Executive Summary\nSolid deal.");
    }

    #[test]
    fn response_without_candidates_is_invalid() {
        let parsed: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let err = extract_memo_text(parsed).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidResponse(_)));
    }

    #[test]
    fn response_without_parts_is_invalid() {
        let raw = r#"{"candidates": [{"content": {"parts": []}}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        let err = extract_memo_text(parsed).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn no_address_short_circuits_to_guidance_memo() {
        // No HTTP traffic happens on this path, so the unused base_url is fine.
        let client = test_client().with_base_url("http://127.0.0.1:0");
        let memo = client.analyze("A building in Chicago.").await.unwrap();
        assert!(memo.text.contains("Could not identify a property address"));
    }

    #[test]
    fn request_serializes_camel_case_generation_config() {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: "hello".to_string(),
                }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: Some(0.2),
                max_output_tokens: Some(64),
            }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 64);
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }
}
