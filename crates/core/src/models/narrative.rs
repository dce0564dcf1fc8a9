use serde::{Deserialize, Serialize};

/// Fewest insight statements a narrative may carry.
pub const MIN_INSIGHTS: usize = 3;
/// Most insight statements a narrative may carry.
pub const MAX_INSIGHTS: usize = 5;

/// Qualitative narrative written from calculated metrics.
///
/// Never the source of truth for figures; those live in
/// [`CalculatedInsights`](super::insights::CalculatedInsights).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextualInsights {
    /// 3–5 short plain-prose statements
    pub insights: Vec<String>,

    /// One forecast paragraph
    pub forecast: String,
}
