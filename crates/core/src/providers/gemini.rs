use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::GenerationError;
use crate::prompts::PromptSpec;
use super::response::{extract_json, truncate_body};
use super::traits::TextGenerationService;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const PROVIDER_NAME: &str = "Gemini";

/// Google Gemini `generateContent` provider.
///
/// - **Auth**: API key sent in the `x-goog-api-key` header, never in the URL.
/// - **Structured output**: `responseMimeType: application/json` plus the
///   prompt's `responseSchema`.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(timeout_secs));
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_secs;
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different API root (proxy or gateway).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Endpoint the request is posted to.
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// JSON body sent for `spec`.
    pub fn request_body(&self, spec: &PromptSpec) -> Result<Value, GenerationError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: spec.rendered(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: spec.temperature(),
                response_mime_type: "application/json",
                response_schema: spec.output_schema(),
            },
        };
        serde_json::to_value(&request)
            .map_err(|e| GenerationError::MalformedOutput(format!("Cannot encode request: {e}")))
    }

    /// Pull the structured answer out of a `generateContent` response body.
    pub fn parse_response_body(body: &str) -> Result<Value, GenerationError> {
        let resp: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
            GenerationError::MalformedOutput(format!("Unexpected Gemini response: {e}"))
        })?;

        if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GenerationError::Api {
                provider: PROVIDER_NAME.into(),
                status: 200,
                message: format!("Prompt blocked: {reason}"),
            });
        }

        let text: String = resp
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        extract_json(&text)
    }
}

// ── Gemini API request/response types ───────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl TextGenerationService for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, spec: &PromptSpec) -> Result<Value, GenerationError> {
        let has_key = !self.api_key.trim().is_empty();
        // Gateways behind a custom base URL may add credentials themselves.
        if !has_key && self.base_url == DEFAULT_BASE_URL {
            return Err(GenerationError::MissingApiKey(PROVIDER_NAME.into()));
        }

        let body = self.request_body(spec)?;
        let mut request = self.client.post(self.endpoint()).json(&body);
        if has_key {
            request = request.header("x-goog-api-key", &self.api_key);
        }
        let resp = request.send().await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Api {
                provider: PROVIDER_NAME.into(),
                status: status.as_u16(),
                message: truncate_body(&text),
            });
        }

        Self::parse_response_body(&text)
    }
}
