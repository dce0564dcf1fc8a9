//! Plain-text rendering of analysis reports for the terminal.

use std::fmt;

use portfolio_insights_core::models::insights::NO_ASSET;
use portfolio_insights_core::models::report::AnalysisReport;

/// Format an amount as US dollars with thousands separators: `-$1,234.50`.
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}

/// Format a percentage with an explicit sign: `+20.00%`, `-3.10%`.
pub fn format_percent(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.2}%")
    } else {
        format!("{value:.2}%")
    }
}

/// Render the full report as aligned plain text.
pub fn render_report(report: &AnalysisReport) -> String {
    ReportView(report).to_string()
}

/// Terminal layout of an [`AnalysisReport`].
pub struct ReportView<'a>(pub &'a AnalysisReport);

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let c = &report.calculated;

        writeln!(f, "Portfolio Summary")?;
        writeln!(f, "  {:<20}{}", "Total value:", format_currency(c.total_value))?;
        writeln!(f, "  {:<20}{}", "Total investment:", format_currency(c.total_investment))?;
        writeln!(
            f,
            "  {:<20}{} ({})",
            "Gain / loss:",
            format_currency(c.overall_gain_loss_value),
            format_percent(c.overall_gain_loss_percent)
        )?;
        if c.best_performer.name != NO_ASSET {
            writeln!(
                f,
                "  {:<20}{} ({})",
                "Best performer:",
                c.best_performer.name,
                format_percent(c.best_performer.return_percentage)
            )?;
            writeln!(
                f,
                "  {:<20}{} ({})",
                "Biggest winner:",
                c.biggest_winner.name,
                format_currency(c.biggest_winner.gain)
            )?;
        }
        writeln!(
            f,
            "  {:<20}{}",
            "10% market drop:",
            format_currency(c.market_drop_simulation)
        )?;

        if !c.asset_allocation.is_empty() {
            writeln!(f, "\nAllocation")?;
            for (category, pct) in &c.asset_allocation {
                writeln!(f, "  {:<20}{pct:.2}%", category.label())?;
            }
        }

        if !report.holdings.is_empty() {
            writeln!(f, "\nHoldings")?;
            for h in &report.holdings {
                writeln!(
                    f,
                    "  {:<8}{:<24}{:>12}  {:>14}  {:>9}",
                    h.symbol,
                    h.name,
                    h.quantity,
                    format_currency(h.current_value),
                    format_percent(h.return_percentage)
                )?;
            }
        }

        if !c.underperforming_assets.is_empty() {
            writeln!(f, "\nUnderperforming")?;
            for a in &c.underperforming_assets {
                writeln!(f, "  {} ({})", a.name, a.symbol)?;
            }
        }

        match (&report.narrative, &report.narration_error) {
            (Some(narrative), _) => {
                writeln!(f, "\nInsights")?;
                for insight in &narrative.insights {
                    writeln!(f, "  - {insight}")?;
                }
                writeln!(f, "\nForecast\n  {}", narrative.forecast)
            }
            (None, Some(err)) => writeln!(f, "\nInsights unavailable: {err}"),
            (None, None) => Ok(()),
        }
    }
}
