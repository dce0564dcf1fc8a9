//! Prompt templates sent to the text-generation collaborator.
//!
//! Templates are plain data: a name, a body with `{{variable}}`
//! placeholders, and a sampling temperature. The built-in library can be
//! replaced wholesale or per entry from [`Settings`](crate::models::settings::Settings).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::CoreError;

/// Template variable holding the raw portfolio text.
pub const VAR_PORTFOLIO_DATA: &str = "portfolio_data";
/// Template variable holding serialized calculated insights.
pub const VAR_CALCULATED_INSIGHTS: &str = "calculated_insights";
/// Template variable holding the serialized Q&A context bundle.
pub const VAR_CONTEXT_DATA: &str = "context_data";
/// Template variable holding the user's question.
pub const VAR_QUESTION: &str = "question";

const PARSE_PORTFOLIO_PROMPT: &str = "\
You extract structured holdings from raw portfolio data. Extraction is your only job.

Portfolio data:
{{portfolio_data}}

Rules:
1. The data may be CSV, JSON or free text. Find every holding in it: name, ticker symbol, category, quantity, purchase price per unit and current price per unit.
2. Return one record per holding present in the data. Do not add holdings that are not there and do not drop any that are.
3. Copy numbers exactly as given. Do not calculate, aggregate, convert or estimate anything.
4. category must be one of Stock, Crypto or Real Estate. Omit it when the data gives no way to tell.
5. Never invent plausible-looking values for fields the data does not contain.";

const TEXTUAL_INSIGHTS_PROMPT: &str = "\
You are a financial analyst writing for a non-expert reader. The metrics below were already calculated from the user's portfolio.

Calculated portfolio metrics (JSON):
{{calculated_insights}}

Rules:
1. Write between 3 and 5 short insights about the portfolio's strengths, weaknesses and risks.
2. Write exactly one short paragraph forecasting how the portfolio may perform. Keep it high level; it is not financial advice.
3. Use plain sentences. No bullet markers, numbering or markdown.
4. Only mention figures that appear in, or follow directly from, the metrics above. Do not introduce new numbers.";

const PORTFOLIO_QA_PROMPT: &str = "\
You are a helpful financial assistant answering questions about the user's investment portfolio. You may also answer general questions.

Portfolio data (JSON; `parsed` lists the holdings, `calculated` holds figures already shown to the user):
{{context_data}}

Rules:
1. When asked for a figure that exists in `calculated` (total value, investment, gain or loss, allocation, best performer, biggest winner, market drop simulation), quote that value. Never recompute or estimate it yourself.
2. When the question is about the portfolio but the data cannot answer it, say so plainly instead of guessing a number.
3. When the question is not about the portfolio, answer it as a general assistant.
4. Be clear, concise and professional.

Question:
\"{{question}}\"";

/// A single prompt: body text plus generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Identifier used in logs
    pub name: String,

    /// Body with `{{variable}}` placeholders
    pub template: String,

    /// Sampling temperature; `None` leaves the provider default
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, template: impl Into<String>, temperature: Option<f32>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            temperature,
        }
    }

    /// Names of all placeholders in the template, in order of appearance.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let name = after[..end].trim().to_string();
                    if !names.contains(&name) {
                        names.push(name);
                    }
                    rest = &after[end + 2..];
                }
                None => break,
            }
        }
        names
    }

    /// Substitute every placeholder. Fails if a placeholder has no value.
    pub fn render(&self, variables: &BTreeMap<String, String>) -> Result<String, CoreError> {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                break;
            };
            let name = after[..end].trim();
            let value = variables.get(name).ok_or_else(|| {
                CoreError::Config(format!(
                    "Prompt '{}' references unknown variable '{name}'",
                    self.name
                ))
            })?;
            out.push_str(&rest[..start]);
            out.push_str(value);
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.template.trim().is_empty() {
            return Err(CoreError::Config(format!("Prompt '{}' is empty", self.name)));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(CoreError::Config(format!(
                    "Prompt '{}' temperature {t} is outside 0.0..=2.0",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// The three prompts the pipeline uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptLibrary {
    pub parse_portfolio: PromptTemplate,
    pub textual_insights: PromptTemplate,
    pub portfolio_qa: PromptTemplate,
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self {
            parse_portfolio: PromptTemplate::new("parse_portfolio", PARSE_PORTFOLIO_PROMPT, Some(0.0)),
            textual_insights: PromptTemplate::new(
                "textual_insights",
                TEXTUAL_INSIGHTS_PROMPT,
                Some(0.5),
            ),
            portfolio_qa: PromptTemplate::new("portfolio_qa", PORTFOLIO_QA_PROMPT, None),
        }
    }
}

impl PromptLibrary {
    pub fn validate(&self) -> Result<(), CoreError> {
        self.parse_portfolio.validate()?;
        self.textual_insights.validate()?;
        self.portfolio_qa.validate()
    }
}

/// A fully specified collaborator request: template, bound variables and
/// the JSON schema the answer must follow.
///
/// Construction renders the template once, so a spec that exists is
/// always sendable.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    template: PromptTemplate,
    variables: BTreeMap<String, String>,
    output_schema: Value,
    rendered: String,
}

impl PromptSpec {
    pub fn new(
        template: &PromptTemplate,
        variables: BTreeMap<String, String>,
        output_schema: Value,
    ) -> Result<Self, CoreError> {
        let rendered = template.render(&variables)?;
        Ok(Self {
            template: template.clone(),
            variables,
            output_schema,
            rendered,
        })
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    pub fn temperature(&self) -> Option<f32> {
        self.template.temperature
    }

    pub fn output_schema(&self) -> &Value {
        &self.output_schema
    }

    /// The prompt text with all variables substituted.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }
}
