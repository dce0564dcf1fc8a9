use async_trait::async_trait;
use serde_json::Value;

use crate::errors::GenerationError;
use crate::prompts::PromptSpec;
use crate::schema::Validate;

/// Trait abstraction for every text-generation backend.
///
/// Each hosted model API (Gemini, OpenAI, a test double) implements
/// this trait. The pipeline services only ever see `dyn TextGenerationService`,
/// so swapping the backend touches nothing else.
///
/// Implementations return the raw JSON the model produced. They must not
/// repair or reshape it; validation happens in [`complete_as`].
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait TextGenerationService: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Send the rendered prompt with its output schema and return the
    /// structured JSON answer. A single attempt; no retries.
    async fn complete(&self, spec: &PromptSpec) -> Result<Value, GenerationError>;
}

/// Call the collaborator and validate its answer as `T`.
pub async fn complete_as<T: Validate>(
    service: &dyn TextGenerationService,
    spec: &PromptSpec,
) -> Result<T, GenerationError> {
    tracing::debug!(
        prompt = spec.name(),
        provider = service.name(),
        model = service.model(),
        "dispatching prompt"
    );
    let value = service.complete(spec).await?;
    T::validate(&value).map_err(|e| {
        tracing::warn!(prompt = spec.name(), field = %e.field, "collaborator output rejected");
        GenerationError::Schema(e)
    })
}
