use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::asset::ParsedPortfolio;
use super::insights::CalculatedInsights;

/// The bundle a Q&A turn is grounded in: parsed assets plus the figures
/// already shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioContext {
    pub parsed: ParsedPortfolio,
    pub calculated: CalculatedInsights,
}

impl PortfolioContext {
    pub fn new(parsed: ParsedPortfolio, calculated: CalculatedInsights) -> Self {
        Self { parsed, calculated }
    }

    /// Serialize to the `contextData` string passed to the Q&A prompt.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize Q&A context: {e}")))
    }
}
