use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::asset::{AssetCategory, ParsedAsset};

/// Name used by [`BestPerformer`] and [`BiggestWinner`] when there are no assets.
pub const NO_ASSET: &str = "N/A";

/// Aggregate metrics derived from a parsed portfolio.
///
/// A pure function of the asset list: the same input always yields
/// bit-identical output. Field names serialize in camelCase because this
/// structure is handed verbatim to the narrative and Q&A prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedInsights {
    /// Σ(quantity × current price)
    pub total_value: f64,

    /// Σ(quantity × purchase price)
    pub total_investment: f64,

    /// total_value − total_investment
    pub overall_gain_loss_value: f64,

    /// Gain/loss as a percentage of total_investment (0 when nothing invested)
    pub overall_gain_loss_percent: f64,

    pub best_performer: BestPerformer,

    pub biggest_winner: BiggestWinner,

    /// Percentage of total_value held in each category
    pub asset_allocation: BTreeMap<AssetCategory, f64>,

    /// Assets with a return of 0% or less, in input order
    pub underperforming_assets: Vec<ParsedAsset>,

    /// Portfolio value after a uniform 10% price drop
    pub market_drop_simulation: f64,
}

impl CalculatedInsights {
    /// The all-zero result for an empty portfolio.
    pub fn empty() -> Self {
        Self {
            total_value: 0.0,
            total_investment: 0.0,
            overall_gain_loss_value: 0.0,
            overall_gain_loss_percent: 0.0,
            best_performer: BestPerformer::none(),
            biggest_winner: BiggestWinner::none(),
            asset_allocation: BTreeMap::new(),
            underperforming_assets: Vec::new(),
            market_drop_simulation: 0.0,
        }
    }
}

/// Asset with the highest per-asset return percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestPerformer {
    pub name: String,
    pub return_percentage: f64,
}

impl BestPerformer {
    pub fn none() -> Self {
        Self {
            name: NO_ASSET.to_string(),
            return_percentage: 0.0,
        }
    }
}

/// Asset with the highest absolute gain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiggestWinner {
    pub name: String,
    pub gain: f64,
}

impl BiggestWinner {
    pub fn none() -> Self {
        Self {
            name: NO_ASSET.to_string(),
            gain: 0.0,
        }
    }
}

/// Per-asset breakdown for dashboards and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingSummary {
    pub name: String,

    pub symbol: String,

    pub category: AssetCategory,

    /// Units held
    pub quantity: f64,

    /// quantity × current price
    pub current_value: f64,

    /// quantity × purchase price
    pub investment: f64,

    /// current_value − investment
    pub gain: f64,

    /// Percentage return on this asset (0 when nothing invested)
    pub return_percentage: f64,

    /// This asset's value / total portfolio value × 100
    pub allocation_percentage: f64,
}
