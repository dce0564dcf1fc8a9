use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::asset::ParsedPortfolio;
use crate::prompts::{PromptSpec, PromptTemplate, VAR_PORTFOLIO_DATA};
use crate::providers::traits::{complete_as, TextGenerationService};
use crate::schema::Validate;

/// Turns raw portfolio text (CSV, JSON or prose) into normalized assets.
///
/// Extraction only: the collaborator is told not to compute anything, and
/// its answer is validated before it is returned. Outcomes are
/// all-or-nothing; a single bad record fails the whole parse.
pub struct ParserService {
    generator: Arc<dyn TextGenerationService>,
    template: PromptTemplate,
}

impl ParserService {
    pub fn new(generator: Arc<dyn TextGenerationService>, template: PromptTemplate) -> Self {
        Self {
            generator,
            template,
        }
    }

    /// Parse `portfolio_data` into a list of assets.
    pub async fn parse(&self, portfolio_data: &str) -> Result<ParsedPortfolio, CoreError> {
        if portfolio_data.trim().is_empty() {
            return Err(CoreError::InvalidInput("Portfolio data is empty".into()));
        }

        let mut variables = BTreeMap::new();
        variables.insert(VAR_PORTFOLIO_DATA.to_string(), portfolio_data.to_string());
        let spec = PromptSpec::new(&self.template, variables, ParsedPortfolio::output_schema())?;

        let parsed: ParsedPortfolio = complete_as(self.generator.as_ref(), &spec)
            .await
            .map_err(CoreError::Parse)?;

        tracing::info!(assets = parsed.len(), "portfolio parsed");
        Ok(parsed)
    }
}
