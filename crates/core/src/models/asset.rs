use serde::{Deserialize, Serialize};

/// The category of a parsed holding.
/// Drives the allocation breakdown in [`CalculatedInsights`](super::insights::CalculatedInsights).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetCategory {
    /// Stocks / equities (AAPL, MSFT, etc.)
    Stock,
    /// Cryptocurrencies (BTC, ETH, etc.)
    Crypto,
    /// Real-estate units or property funds
    #[serde(rename = "Real Estate", alias = "RealEstate")]
    RealEstate,
    /// Source data carried no category for this holding
    #[default]
    Other,
}

impl AssetCategory {
    /// Display label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            AssetCategory::Stock => "Stock",
            AssetCategory::Crypto => "Crypto",
            AssetCategory::RealEstate => "Real Estate",
            AssetCategory::Other => "Other",
        }
    }

    /// Parse a category as the collaborator may emit it.
    /// Accepts the display label and the `RealEstate` spelling; anything else is `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Stock" => Some(AssetCategory::Stock),
            "Crypto" => Some(AssetCategory::Crypto),
            "Real Estate" | "RealEstate" => Some(AssetCategory::RealEstate),
            "Other" => Some(AssetCategory::Other),
            _ => None,
        }
    }

    /// Categories a collaborator is allowed to emit.
    pub const EMITTABLE: [AssetCategory; 3] = [
        AssetCategory::Stock,
        AssetCategory::Crypto,
        AssetCategory::RealEstate,
    ];
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One holding extracted from raw portfolio input.
///
/// Produced only by the parser; never mutated downstream. Values are
/// copied from the source text as-is, so a negative quantity is kept
/// rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAsset {
    /// Display name (e.g., "Apple Inc.")
    pub name: String,

    /// Ticker symbol (e.g., "AAPL")
    pub symbol: String,

    #[serde(default)]
    pub category: AssetCategory,

    /// Units held, may be fractional
    pub quantity: f64,

    /// Cost basis per unit
    pub purchase_price: f64,

    /// Current market price per unit
    pub current_price: f64,
}

impl ParsedAsset {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        category: AssetCategory,
        quantity: f64,
        purchase_price: f64,
        current_price: f64,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            category,
            quantity,
            purchase_price,
            current_price,
        }
    }

    /// quantity × purchase price
    pub fn investment(&self) -> f64 {
        self.quantity * self.purchase_price
    }

    /// quantity × current price
    pub fn current_value(&self) -> f64 {
        self.quantity * self.current_price
    }

    /// Absolute gain in currency units.
    pub fn gain(&self) -> f64 {
        self.current_value() - self.investment()
    }

    /// Return in percent of the investment; 0 when nothing was invested.
    pub fn return_percentage(&self) -> f64 {
        let investment = self.investment();
        if investment == 0.0 {
            0.0
        } else {
            (self.gain() / investment) * 100.0
        }
    }
}

/// The parser's output: every holding found in the input, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedPortfolio {
    pub assets: Vec<ParsedAsset>,
}

impl ParsedPortfolio {
    pub fn new(assets: Vec<ParsedAsset>) -> Self {
        Self { assets }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
