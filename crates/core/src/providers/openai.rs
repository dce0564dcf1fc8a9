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

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const PROVIDER_NAME: &str = "OpenAI";

/// OpenAI chat-completions provider using `json_schema` response format.
///
/// Also works against any gateway that speaks the same protocol
/// (set a custom base URL).
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
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

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// JSON body sent for `spec`.
    pub fn request_body(&self, spec: &PromptSpec) -> Result<Value, GenerationError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: spec.rendered(),
            }],
            temperature: spec.temperature(),
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: spec.name(),
                    schema: spec.output_schema(),
                },
            },
        };
        serde_json::to_value(&request)
            .map_err(|e| GenerationError::MalformedOutput(format!("Cannot encode request: {e}")))
    }

    /// Pull the structured answer out of a chat-completions response body.
    pub fn parse_response_body(body: &str) -> Result<Value, GenerationError> {
        let resp: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
            GenerationError::MalformedOutput(format!("Unexpected OpenAI response: {e}"))
        })?;

        let message = resp
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(GenerationError::EmptyResponse)?;

        if let Some(refusal) = message.refusal {
            return Err(GenerationError::Api {
                provider: PROVIDER_NAME.into(),
                status: 200,
                message: format!("Model refused: {}", truncate_body(&refusal)),
            });
        }

        extract_json(message.content.as_deref().unwrap_or_default())
    }
}

// ── OpenAI API request/response types ───────────────────────────────

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    schema: &'a Value,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl TextGenerationService for OpenAiProvider {
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
            request = request.bearer_auth(&self.api_key);
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
