//! Validation of untrusted collaborator output.
//!
//! Each output type implements [`Validate`]: a JSON schema that is sent
//! with the request, and a function that walks the returned JSON and
//! either builds the typed value or names the first field that does not
//! fit. Unknown fields are dropped. Nothing is coerced: a numeric string
//! where a number belongs is an error, not a number.

use serde_json::{json, Map, Value};

use crate::errors::SchemaValidationError;
use crate::models::asset::{AssetCategory, ParsedAsset, ParsedPortfolio};
use crate::models::chat::QaAnswer;
use crate::models::narrative::{TextualInsights, MAX_INSIGHTS, MIN_INSIGHTS};

/// A type that can be built from untrusted JSON.
pub trait Validate: Sized {
    /// Check `value` against this type's shape and build it.
    fn validate(value: &Value) -> Result<Self, SchemaValidationError>;

    /// JSON schema describing the shape, sent to the collaborator.
    fn output_schema() -> Value;
}

// ── Field readers ───────────────────────────────────────────────────

/// Short description of a JSON value for error messages.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => {
            let shown: String = s.chars().take(40).collect();
            if shown.len() < s.len() {
                format!("string \"{shown}…\"")
            } else {
                format!("string \"{shown}\"")
            }
        }
        Value::Array(a) => format!("array of {} items", a.len()),
        Value::Object(_) => "object".into(),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn root(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

fn object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaValidationError> {
    value
        .as_object()
        .ok_or_else(|| SchemaValidationError::new(root(path), "object", describe(value)))
}

fn field<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    key: &str,
    expected: &str,
) -> Result<&'a Value, SchemaValidationError> {
    match obj.get(key) {
        Some(Value::Null) | None => Err(SchemaValidationError::new(join(path, key), expected, "missing")),
        Some(v) => Ok(v),
    }
}

fn non_empty_string(
    obj: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<String, SchemaValidationError> {
    const EXPECTED: &str = "non-empty string";
    let value = field(obj, path, key, EXPECTED)?;
    match value.as_str() {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(SchemaValidationError::new(join(path, key), EXPECTED, describe(value))),
    }
}

fn finite_number(
    obj: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<f64, SchemaValidationError> {
    const EXPECTED: &str = "finite number";
    let value = field(obj, path, key, EXPECTED)?;
    match value.as_f64() {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(SchemaValidationError::new(join(path, key), EXPECTED, describe(value))),
    }
}

fn array<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<&'a Vec<Value>, SchemaValidationError> {
    let value = field(obj, path, key, "array")?;
    value
        .as_array()
        .ok_or_else(|| SchemaValidationError::new(join(path, key), "array", describe(value)))
}

/// Drop a leading list marker ("- ", "* ", "• ", "– ", "1. ", "2) ") from a statement.
/// A dash directly followed by a digit is a sign and stays.
fn strip_list_marker(text: &str) -> &str {
    let trimmed = text.trim();
    for marker in ["- ", "* ", "• ", "– "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim_start();
        }
    }
    trimmed
}

// ── ParsedAsset / ParsedPortfolio ───────────────────────────────────

const OVERFLOW_EXPECTED: &str = "values whose products and totals are finite";

impl ParsedAsset {
    fn validate_at(value: &Value, path: &str) -> Result<Self, SchemaValidationError> {
        let obj = object(value, path)?;

        let category = match obj.get("category") {
            None | Some(Value::Null) => AssetCategory::default(),
            Some(v) => v
                .as_str()
                .and_then(AssetCategory::from_label)
                .ok_or_else(|| {
                    SchemaValidationError::new(
                        join(path, "category"),
                        "one of \"Stock\", \"Crypto\", \"Real Estate\"",
                        describe(v),
                    )
                })?,
        };

        let asset = ParsedAsset {
            name: non_empty_string(obj, path, "name")?,
            symbol: non_empty_string(obj, path, "symbol")?,
            category,
            quantity: finite_number(obj, path, "quantity")?,
            purchase_price: finite_number(obj, path, "purchasePrice")?,
            current_price: finite_number(obj, path, "currentPrice")?,
        };

        // Products must be finite too, not just their factors.
        let derived = [asset.investment(), asset.current_value(), asset.gain()];
        if derived.iter().any(|v| !v.is_finite()) {
            return Err(SchemaValidationError::new(
                join(path, "quantity"),
                OVERFLOW_EXPECTED,
                format!(
                    "quantity {} with prices {} / {}",
                    asset.quantity, asset.purchase_price, asset.current_price
                ),
            ));
        }
        Ok(asset)
    }

    fn json_schema() -> Value {
        let categories: Vec<&str> = AssetCategory::EMITTABLE.iter().map(|c| c.label()).collect();
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Display name of the holding." },
                "symbol": { "type": "string", "description": "Ticker symbol." },
                "category": { "type": "string", "enum": categories },
                "quantity": { "type": "number", "description": "Units held." },
                "purchasePrice": { "type": "number", "description": "Cost basis per unit." },
                "currentPrice": { "type": "number", "description": "Current market price per unit." }
            },
            "required": ["name", "symbol", "quantity", "purchasePrice", "currentPrice"]
        })
    }
}

impl Validate for ParsedAsset {
    fn validate(value: &Value) -> Result<Self, SchemaValidationError> {
        Self::validate_at(value, "")
    }

    fn output_schema() -> Value {
        Self::json_schema()
    }
}

impl Validate for ParsedPortfolio {
    fn validate(value: &Value) -> Result<Self, SchemaValidationError> {
        let obj = object(value, "")?;
        let items = array(obj, "", "assets")?;
        let assets = items
            .iter()
            .enumerate()
            .map(|(i, item)| ParsedAsset::validate_at(item, &format!("assets[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        let total_value: f64 = assets.iter().map(ParsedAsset::current_value).sum();
        let total_investment: f64 = assets.iter().map(ParsedAsset::investment).sum();
        if !(total_value - total_investment).is_finite() {
            return Err(SchemaValidationError::new(
                "assets",
                OVERFLOW_EXPECTED,
                "totals out of range",
            ));
        }
        Ok(ParsedPortfolio { assets })
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "assets": {
                    "type": "array",
                    "description": "Every holding found in the data, in source order.",
                    "items": ParsedAsset::json_schema()
                }
            },
            "required": ["assets"]
        })
    }
}

// ── TextualInsights ─────────────────────────────────────────────────

impl Validate for TextualInsights {
    fn validate(value: &Value) -> Result<Self, SchemaValidationError> {
        let obj = object(value, "")?;
        let items = array(obj, "", "insights")?;

        let expected = format!("array of {MIN_INSIGHTS}-{MAX_INSIGHTS} non-empty strings");
        if !(MIN_INSIGHTS..=MAX_INSIGHTS).contains(&items.len()) {
            return Err(SchemaValidationError::new(
                "insights",
                expected,
                format!("array of {} items", items.len()),
            ));
        }

        let mut insights = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let text = item.as_str().map(strip_list_marker).unwrap_or_default();
            if text.is_empty() {
                return Err(SchemaValidationError::new(
                    format!("insights[{i}]"),
                    "non-empty string",
                    describe(item),
                ));
            }
            insights.push(text.to_string());
        }

        Ok(TextualInsights {
            insights,
            forecast: non_empty_string(obj, "", "forecast")?,
        })
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "insights": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": MIN_INSIGHTS,
                    "maxItems": MAX_INSIGHTS,
                    "description": "Short plain-prose insights grounded in the metrics."
                },
                "forecast": {
                    "type": "string",
                    "description": "One paragraph forecast."
                }
            },
            "required": ["insights", "forecast"]
        })
    }
}

// ── QaAnswer ────────────────────────────────────────────────────────

impl Validate for QaAnswer {
    fn validate(value: &Value) -> Result<Self, SchemaValidationError> {
        let obj = object(value, "")?;
        Ok(QaAnswer {
            answer: non_empty_string(obj, "", "answer")?,
        })
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "answer": { "type": "string", "description": "Answer to the user's question." }
            },
            "required": ["answer"]
        })
    }
}
