use thiserror::Error;

use crate::models::session::SessionState;

/// Short message shown to users when any pipeline action fails.
/// Transport-level detail stays in the logs.
pub const USER_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error while processing your request.";

/// Structured output did not match the expected shape.
///
/// Always surfaced, never silently patched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Schema validation failed at `{field}`: expected {expected}, found {found}")]
pub struct SchemaValidationError {
    /// Path to the offending field, e.g. `assets[2].quantity`
    pub field: String,
    /// Human-readable description of the expected type
    pub expected: String,
    /// Short description of what was actually present
    pub found: String,
}

impl SchemaValidationError {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Failure of a single call to the text-generation collaborator.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API error ({provider}, HTTP {status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Collaborator returned no output")]
    EmptyResponse,

    #[error("Collaborator output is not valid JSON: {0}")]
    MalformedOutput(String),

    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    #[error("No API key configured for provider: {0}")]
    MissingApiKey(String),
}

/// Unified error type for the portfolio-insights-core library.
/// Every public pipeline operation returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Pipeline stages ─────────────────────────────────────────────
    #[error("Portfolio parsing failed: {0}")]
    Parse(#[source] GenerationError),

    #[error("Narrative generation failed: {0}")]
    Narration(#[source] GenerationError),

    #[error("Portfolio Q&A failed: {0}")]
    Qa(#[source] GenerationError),

    // ── Input / State ───────────────────────────────────────────────
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cannot {action} while session is {state}")]
    InvalidState {
        action: String,
        state: SessionState,
    },

    // ── Configuration / Serialization ───────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),
}

impl CoreError {
    /// The message a front end should display for this error.
    ///
    /// Collaborator failures collapse to [`USER_ERROR_MESSAGE`]; input and
    /// state errors are the user's own doing and are shown verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CoreError::InvalidInput(msg) => msg.clone(),
            CoreError::InvalidState { .. } => self.to_string(),
            _ => USER_ERROR_MESSAGE.to_string(),
        }
    }

    /// Whether re-submitting the triggering action can succeed.
    /// Only a broken configuration needs outside intervention.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CoreError::Config(_))
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return GenerationError::Timeout;
        }
        // reqwest errors embed the request URL; strip the query so keys
        // passed as parameters never reach logs or messages.
        let msg = e.to_string();
        let sanitized = match msg.find('?') {
            Some(idx) => format!("{}?<query redacted>", &msg[..idx]),
            None => msg,
        };
        GenerationError::Network(sanitized)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}
