use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::chat::QaAnswer;
use crate::models::context::PortfolioContext;
use crate::prompts::{PromptSpec, PromptTemplate, VAR_CONTEXT_DATA, VAR_QUESTION};
use crate::providers::traits::{complete_as, TextGenerationService};
use crate::schema::Validate;

/// Answers free-form questions grounded in a portfolio context bundle.
///
/// Each call is stateless and carries its full context, so concurrent
/// questions need no coordination.
pub struct QaService {
    generator: Arc<dyn TextGenerationService>,
    template: PromptTemplate,
}

impl QaService {
    pub fn new(generator: Arc<dyn TextGenerationService>, template: PromptTemplate) -> Self {
        Self {
            generator,
            template,
        }
    }

    /// Answer `question` using the serialized context in `context_data`.
    pub async fn answer(&self, question: &str, context_data: &str) -> Result<String, CoreError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(CoreError::InvalidInput("Question is empty".into()));
        }

        let mut variables = BTreeMap::new();
        variables.insert(VAR_QUESTION.to_string(), question.to_string());
        variables.insert(VAR_CONTEXT_DATA.to_string(), context_data.to_string());
        let spec = PromptSpec::new(&self.template, variables, QaAnswer::output_schema())?;

        let reply: QaAnswer = complete_as(self.generator.as_ref(), &spec)
            .await
            .map_err(CoreError::Qa)?;
        Ok(reply.answer)
    }

    /// Answer `question` against a typed context bundle.
    pub async fn answer_with_context(
        &self,
        question: &str,
        context: &PortfolioContext,
    ) -> Result<String, CoreError> {
        let context_data = context.to_json()?;
        self.answer(question, &context_data).await
    }
}
