use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::asset::ParsedPortfolio;
use super::context::PortfolioContext;
use super::insights::{CalculatedInsights, HoldingSummary};
use super::narrative::TextualInsights;

/// Everything one analyze action produced.
///
/// Replaced wholesale by the next analysis; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub id: Uuid,

    pub analyzed_at: DateTime<Utc>,

    pub parsed: ParsedPortfolio,

    pub calculated: CalculatedInsights,

    /// Per-asset breakdown, largest holding first
    pub holdings: Vec<HoldingSummary>,

    /// `None` when narration was skipped or failed
    pub narrative: Option<TextualInsights>,

    /// User-facing message when narration failed
    pub narration_error: Option<String>,
}

impl AnalysisReport {
    pub fn new(
        parsed: ParsedPortfolio,
        calculated: CalculatedInsights,
        holdings: Vec<HoldingSummary>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            parsed,
            calculated,
            holdings,
            narrative: None,
            narration_error: None,
        }
    }

    /// The Q&A context bundle for this analysis.
    pub fn context(&self) -> PortfolioContext {
        PortfolioContext::new(self.parsed.clone(), self.calculated.clone())
    }
}
