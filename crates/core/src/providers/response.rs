use serde_json::Value;

use crate::errors::GenerationError;

/// Longest slice of an error body kept in [`GenerationError::Api`].
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Turn the model's text answer into JSON.
///
/// Models sometimes wrap JSON in a markdown code fence even when asked
/// for `application/json`; the fence is removed before parsing.
pub fn extract_json(text: &str) -> Result<Value, GenerationError> {
    let cleaned = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    if cleaned.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    serde_json::from_str(cleaned).map_err(|e| {
        GenerationError::MalformedOutput(format!(
            "{e} (output starts with: {})",
            truncate(cleaned, 80)
        ))
    })
}

/// Shorten an HTTP error body for inclusion in an error.
pub fn truncate_body(body: &str) -> String {
    truncate(body.trim(), MAX_ERROR_BODY_CHARS)
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
