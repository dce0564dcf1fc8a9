use serde::{Deserialize, Serialize};

/// Lifecycle of one analysis session.
///
/// ```text
/// Idle → Parsing → Parsed → Calculated → (Narrating) → Ready
/// ```
///
/// Any stage may fall back to `Idle` (failure or reset). `Ready` loops on
/// itself for Q&A and may start a new analysis directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    Parsing,
    Parsed,
    Calculated,
    Narrating,
    Ready,
}

impl SessionState {
    /// Whether moving from `self` to `next` is a legal step.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (_, Idle)
                | (Idle, Parsing)
                | (Ready, Parsing)
                | (Parsing, Parsed)
                | (Parsed, Calculated)
                | (Calculated, Narrating)
                | (Calculated, Ready)
                | (Narrating, Ready)
                | (Ready, Ready)
        )
    }

    /// Q&A is only possible once calculated figures exist and the pipeline settled.
    pub fn accepts_questions(self) -> bool {
        self == SessionState::Ready
    }

    /// A stage is in flight.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            SessionState::Parsing | SessionState::Narrating
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Idle => "Idle",
            SessionState::Parsing => "Parsing",
            SessionState::Parsed => "Parsed",
            SessionState::Calculated => "Calculated",
            SessionState::Narrating => "Narrating",
            SessionState::Ready => "Ready",
        };
        f.write_str(s)
    }
}
