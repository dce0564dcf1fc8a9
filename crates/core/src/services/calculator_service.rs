use std::collections::BTreeMap;

use crate::models::asset::{AssetCategory, ParsedPortfolio};
use crate::models::insights::{BestPerformer, BiggestWinner, CalculatedInsights, HoldingSummary};

/// Share of value kept in the market drop simulation (a 10% drop).
pub const MARKET_DROP_FACTOR: f64 = 0.9;

/// Computes portfolio metrics from parsed assets: totals, gain/loss,
/// winners, allocation breakdown.
///
/// Pure business logic with no I/O; it cannot fail. Iteration
/// follows input order, which decides ties: the first asset to reach a
/// maximum keeps it (strict `>` against the running best).
pub struct CalculatorService;

impl CalculatorService {
    pub fn new() -> Self {
        Self
    }

    /// Compute the full set of aggregate metrics.
    pub fn calculate(&self, portfolio: &ParsedPortfolio) -> CalculatedInsights {
        let assets = &portfolio.assets;
        if assets.is_empty() {
            return CalculatedInsights::empty();
        }

        // 1. Totals
        let total_value: f64 = assets.iter().map(|a| a.current_value()).sum();
        let total_investment: f64 = assets.iter().map(|a| a.investment()).sum();
        let overall_gain_loss_value = total_value - total_investment;
        let overall_gain_loss_percent = if total_investment == 0.0 {
            0.0
        } else {
            (overall_gain_loss_value / total_investment) * 100.0
        };

        // 2. Per-asset pass: winners, category values, underperformers
        let mut best: Option<BestPerformer> = None;
        let mut winner: Option<BiggestWinner> = None;
        let mut category_values: BTreeMap<AssetCategory, f64> = BTreeMap::new();
        let mut underperforming_assets = Vec::new();

        for asset in assets {
            let gain = asset.gain();
            let return_percentage = asset.return_percentage();

            if best
                .as_ref()
                .map_or(true, |b| return_percentage > b.return_percentage)
            {
                best = Some(BestPerformer {
                    name: asset.name.clone(),
                    return_percentage,
                });
            }

            if winner.as_ref().map_or(true, |w| gain > w.gain) {
                winner = Some(BiggestWinner {
                    name: asset.name.clone(),
                    gain,
                });
            }

            *category_values.entry(asset.category).or_insert(0.0) += asset.current_value();

            if return_percentage <= 0.0 {
                underperforming_assets.push(asset.clone());
            }
        }

        // 3. Category values → percentages of total value
        let asset_allocation = category_values
            .into_iter()
            .map(|(category, value)| (category, percent_of(value, total_value)))
            .collect();

        CalculatedInsights {
            total_value,
            total_investment,
            overall_gain_loss_value,
            overall_gain_loss_percent,
            best_performer: best.unwrap_or_else(BestPerformer::none),
            biggest_winner: winner.unwrap_or_else(BiggestWinner::none),
            asset_allocation,
            underperforming_assets,
            market_drop_simulation: total_value * MARKET_DROP_FACTOR,
        }
    }

    /// Per-asset figures, largest current value first.
    /// Equal values keep their input order.
    pub fn holding_breakdown(&self, portfolio: &ParsedPortfolio) -> Vec<HoldingSummary> {
        let total_value: f64 = portfolio.assets.iter().map(|a| a.current_value()).sum();

        let mut holdings: Vec<HoldingSummary> = portfolio
            .assets
            .iter()
            .map(|asset| {
                let current_value = asset.current_value();
                HoldingSummary {
                    name: asset.name.clone(),
                    symbol: asset.symbol.clone(),
                    category: asset.category,
                    quantity: asset.quantity,
                    current_value,
                    investment: asset.investment(),
                    gain: asset.gain(),
                    return_percentage: asset.return_percentage(),
                    allocation_percentage: percent_of(current_value, total_value),
                }
            })
            .collect();

        // sort_by is stable
        holdings.sort_by(|a, b| {
            b.current_value
                .partial_cmp(&a.current_value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        holdings
    }

    /// The `n` largest holdings by current value.
    pub fn top_holdings(&self, portfolio: &ParsedPortfolio, n: usize) -> Vec<HoldingSummary> {
        let mut holdings = self.holding_breakdown(portfolio);
        holdings.truncate(n);
        holdings
    }
}

impl Default for CalculatorService {
    fn default() -> Self {
        Self::new()
    }
}

fn percent_of(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        (part / total) * 100.0
    }
}
