pub mod errors;
pub mod models;
pub mod prompts;
pub mod providers;
pub mod schema;
pub mod services;

use std::sync::Arc;

use models::{
    chat::{ChatMessage, Conversation, FALLBACK_ANSWER},
    report::AnalysisReport,
    session::SessionState,
    settings::Settings,
};
use prompts::PromptLibrary;
use providers::{registry::provider_from_settings, traits::TextGenerationService};
use services::{
    calculator_service::CalculatorService, narrative_service::NarrativeService,
    parser_service::ParserService, qa_service::QaService,
};

use errors::CoreError;

/// Main entry point for the Portfolio Insights core library.
///
/// Drives one analysis session through its states:
/// `Idle → Parsing → Parsed → Calculated → (Narrating) → Ready`.
/// Front ends (web handlers, the CLI, batch jobs) call [`analyze`](Self::analyze)
/// and then [`ask`](Self::ask) as often as they like.
#[must_use]
pub struct PortfolioAnalyzer {
    parser_service: ParserService,
    calculator_service: CalculatorService,
    narrative_service: NarrativeService,
    qa_service: QaService,
    state: SessionState,
    report: Option<AnalysisReport>,
    conversation: Conversation,
    /// User-facing message of the last failed analyze, cleared on the next attempt.
    last_error: Option<String>,
}

impl std::fmt::Debug for PortfolioAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioAnalyzer")
            .field("state", &self.state)
            .field("assets", &self.report.as_ref().map(|r| r.parsed.len()))
            .field("messages", &self.conversation.len())
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl PortfolioAnalyzer {
    /// Create a session backed by `generator`, using `prompts` for every stage.
    pub fn new(generator: Arc<dyn TextGenerationService>, prompts: PromptLibrary) -> Self {
        Self {
            parser_service: ParserService::new(generator.clone(), prompts.parse_portfolio),
            calculator_service: CalculatorService::new(),
            narrative_service: NarrativeService::new(generator.clone(), prompts.textual_insights),
            qa_service: QaService::new(generator, prompts.portfolio_qa),
            state: SessionState::Idle,
            report: None,
            conversation: Conversation::new(),
            last_error: None,
        }
    }

    /// Create a session from configuration, building the selected provider.
    pub fn from_settings(settings: &Settings) -> Result<Self, CoreError> {
        let generator = provider_from_settings(settings)?;
        Ok(Self::new(generator, settings.prompts.clone()))
    }

    // ── Pipeline ────────────────────────────────────────────────────

    /// Parse `portfolio_data`, calculate metrics and, if `narrate` is set,
    /// generate the narrative.
    ///
    /// Replaces any previous report and clears the conversation. A parse
    /// failure leaves the session `Idle` with nothing kept. A narration
    /// failure still ends in `Ready`: the report carries no narrative and
    /// `narration_error` holds the message to show.
    pub async fn analyze(
        &mut self,
        portfolio_data: &str,
        narrate: bool,
    ) -> Result<&AnalysisReport, CoreError> {
        // A dropped analyze future can leave a stage half-done; start over.
        if !matches!(self.state, SessionState::Idle | SessionState::Ready) {
            tracing::debug!(state = %self.state, "discarding interrupted analysis");
            self.state = SessionState::Idle;
        }
        self.report = None;
        self.conversation.clear();
        self.last_error = None;

        self.transition(SessionState::Parsing)?;
        let result = self.parser_service.parse(portfolio_data).await;
        let parsed = match result {
            Ok(parsed) => parsed,
            Err(e) => return Err(self.fail(e)),
        };
        self.transition(SessionState::Parsed)?;

        let calculated = self.calculator_service.calculate(&parsed);
        let holdings = self.calculator_service.holding_breakdown(&parsed);
        self.transition(SessionState::Calculated)?;
        tracing::info!(
            assets = parsed.len(),
            total_value = calculated.total_value,
            gain_loss_percent = calculated.overall_gain_loss_percent,
            "portfolio metrics calculated"
        );

        let mut report = AnalysisReport::new(parsed, calculated, holdings);

        if narrate {
            self.transition(SessionState::Narrating)?;
            match self.narrative_service.generate(&report.calculated).await {
                Ok(narrative) => report.narrative = Some(narrative),
                Err(e) => {
                    tracing::warn!(error = %e, "narration failed; continuing without narrative");
                    report.narration_error = Some(e.user_message());
                }
            }
        }

        self.transition(SessionState::Ready)?;
        let report = self.report.insert(report);
        Ok(&*report)
    }

    /// Ask a question about the analyzed portfolio.
    ///
    /// Requires `Ready`. The question and the answer are appended to the
    /// conversation; on failure the fallback answer is appended instead
    /// and the error returned, leaving earlier turns intact.
    pub async fn ask(&mut self, question: &str) -> Result<String, CoreError> {
        if !self.state.accepts_questions() {
            return Err(CoreError::InvalidState {
                action: "ask a question".into(),
                state: self.state,
            });
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(CoreError::InvalidInput("Question is empty".into()));
        }

        let context_data = self.context_json()?;
        self.conversation.push(ChatMessage::user(question));

        match self.qa_service.answer(question, &context_data).await {
            Ok(answer) => {
                self.conversation.push(ChatMessage::assistant(answer.clone()));
                Ok(answer)
            }
            Err(e) => {
                tracing::warn!(error = %e, "question could not be answered");
                self.conversation.push(ChatMessage::assistant(FALLBACK_ANSWER));
                Err(e)
            }
        }
    }

    /// Drop the report and conversation and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.report = None;
        self.conversation.clear();
        self.last_error = None;
    }

    // ── Inspection ──────────────────────────────────────────────────

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The latest completed analysis, if any.
    #[must_use]
    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// User-facing message of the last failed analysis.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The serialized context bundle Q&A turns are grounded in.
    pub fn context_json(&self) -> Result<String, CoreError> {
        let report = self.report.as_ref().ok_or_else(|| CoreError::InvalidState {
            action: "build a Q&A context".into(),
            state: self.state,
        })?;
        report.context().to_json()
    }

    /// The calculator, for front ends that need extra views such as top holdings.
    #[must_use]
    pub fn calculator(&self) -> &CalculatorService {
        &self.calculator_service
    }

    // ── Internal ────────────────────────────────────────────────────

    fn transition(&mut self, next: SessionState) -> Result<(), CoreError> {
        if !self.state.can_transition_to(next) {
            return Err(CoreError::InvalidState {
                action: format!("move to {next}"),
                state: self.state,
            });
        }
        tracing::debug!(from = %self.state, to = %next, "session transition");
        self.state = next;
        Ok(())
    }

    fn fail(&mut self, error: CoreError) -> CoreError {
        tracing::warn!(error = %error, "analysis failed");
        self.state = SessionState::Idle;
        self.last_error = Some(error.user_message());
        error
    }
}
