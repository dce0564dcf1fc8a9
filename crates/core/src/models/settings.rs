use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::prompts::PromptLibrary;

/// Default request timeout for collaborator calls, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which hosted text-generation API backs the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenAi,
}

impl ProviderKind {
    /// Key under which this provider's API key is stored in [`Settings::api_keys`].
    pub fn key_name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-2.0-flash",
            ProviderKind::OpenAi => "gpt-4o-mini",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key_name())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(CoreError::Config(format!(
                "Unknown provider '{other}': expected 'gemini' or 'openai'"
            ))),
        }
    }
}

/// Runtime configuration: which collaborator to call, with which
/// credentials, and which prompt templates to send.
///
/// Every field has a default, so a settings file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub provider: ProviderKind,

    /// Model override; `None` uses the provider's default model.
    pub model: Option<String>,

    /// API keys keyed by provider name ("gemini", "openai").
    pub api_keys: HashMap<String, String>,

    /// Alternative API base URL (proxies, self-hosted gateways).
    pub base_url: Option<String>,

    pub request_timeout_secs: u64,

    /// Prompt templates. Omitted entries fall back to the built-in ones.
    pub prompts: PromptLibrary,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            api_keys: HashMap::new(),
            base_url: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            prompts: PromptLibrary::default(),
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)
            .map_err(|e| CoreError::Config(format!("Invalid settings JSON: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Cannot read settings file {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) -> Result<(), CoreError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable lookup.
    ///
    /// Recognized: `GEMINI_API_KEY` (or `GOOGLE_API_KEY`), `OPENAI_API_KEY`,
    /// `PORTFOLIO_INSIGHTS_PROVIDER`, `PORTFOLIO_INSIGHTS_MODEL`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_blank("GEMINI_API_KEY").or_else(|| non_blank("GOOGLE_API_KEY")) {
            self.api_keys.insert(ProviderKind::Gemini.key_name().to_string(), key);
        }
        if let Some(key) = non_blank("OPENAI_API_KEY") {
            self.api_keys.insert(ProviderKind::OpenAi.key_name().to_string(), key);
        }
        if let Some(provider) = non_blank("PORTFOLIO_INSIGHTS_PROVIDER") {
            self.provider = provider.parse()?;
        }
        if let Some(model) = non_blank("PORTFOLIO_INSIGHTS_MODEL") {
            self.model = Some(model);
        }
        self.validate()
    }

    /// Reject settings no provider could run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                return Err(CoreError::Config("model must not be blank".into()));
            }
        }
        self.prompts.validate()
    }

    /// The model to request: the override if set, else the provider default.
    #[must_use]
    pub fn effective_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    /// API key for the selected provider, if configured.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_keys
            .get(self.provider.key_name())
            .map(String::as_str)
    }
}
