use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::insights::CalculatedInsights;
use crate::models::narrative::TextualInsights;
use crate::prompts::{PromptSpec, PromptTemplate, VAR_CALCULATED_INSIGHTS};
use crate::providers::traits::{complete_as, TextGenerationService};
use crate::schema::Validate;

/// Writes 3–5 insights and a forecast paragraph from calculated metrics.
///
/// Only metrics are sent, never raw portfolio data. Failures are
/// reported as [`CoreError::Narration`]; the metrics themselves stay valid.
pub struct NarrativeService {
    generator: Arc<dyn TextGenerationService>,
    template: PromptTemplate,
}

impl NarrativeService {
    pub fn new(generator: Arc<dyn TextGenerationService>, template: PromptTemplate) -> Self {
        Self {
            generator,
            template,
        }
    }

    /// Generate the narrative for a calculated-insights structure.
    pub async fn generate(
        &self,
        insights: &CalculatedInsights,
    ) -> Result<TextualInsights, CoreError> {
        let json = serde_json::to_string(insights).map_err(|e| {
            CoreError::Serialization(format!("Failed to serialize calculated insights: {e}"))
        })?;
        self.generate_from_json(&json).await
    }

    /// Generate the narrative from already-serialized calculated insights.
    pub async fn generate_from_json(
        &self,
        calculated_insights: &str,
    ) -> Result<TextualInsights, CoreError> {
        let mut variables = BTreeMap::new();
        variables.insert(
            VAR_CALCULATED_INSIGHTS.to_string(),
            calculated_insights.to_string(),
        );
        let spec = PromptSpec::new(&self.template, variables, TextualInsights::output_schema())?;

        let narrative: TextualInsights = complete_as(self.generator.as_ref(), &spec)
            .await
            .map_err(CoreError::Narration)?;

        tracing::info!(insights = narrative.insights.len(), "narrative generated");
        Ok(narrative)
    }
}
