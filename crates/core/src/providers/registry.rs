use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::settings::{ProviderKind, Settings};

use super::gemini::GeminiProvider;
use super::openai::OpenAiProvider;
use super::traits::TextGenerationService;

/// Build the text-generation backend selected in `settings`.
///
/// An API key is required unless a custom base URL is set: gateways in
/// front of a model often inject credentials themselves.
pub fn provider_from_settings(
    settings: &Settings,
) -> Result<Arc<dyn TextGenerationService>, CoreError> {
    settings.validate()?;

    let api_key = settings.api_key().unwrap_or_default().to_string();
    if api_key.trim().is_empty() && settings.base_url.is_none() {
        return Err(CoreError::Config(format!(
            "No API key configured for provider '{}'",
            settings.provider
        )));
    }

    let model = settings.effective_model();
    let timeout = settings.request_timeout_secs;

    let provider: Arc<dyn TextGenerationService> = match settings.provider {
        ProviderKind::Gemini => {
            let mut p = GeminiProvider::new(api_key, model, timeout);
            if let Some(url) = &settings.base_url {
                p = p.with_base_url(url.clone());
            }
            Arc::new(p)
        }
        ProviderKind::OpenAi => {
            let mut p = OpenAiProvider::new(api_key, model, timeout);
            if let Some(url) = &settings.base_url {
                p = p.with_base_url(url.clone());
            }
            Arc::new(p)
        }
    };

    tracing::debug!(provider = provider.name(), model = provider.model(), "text generation provider ready");
    Ok(provider)
}
