// ═══════════════════════════════════════════════════════════════════
// Schema Validation Tests — parsed portfolios, narratives, answers
// ═══════════════════════════════════════════════════════════════════

use serde_json::json;

use portfolio_insights_core::models::asset::{AssetCategory, ParsedAsset, ParsedPortfolio};
use portfolio_insights_core::models::chat::QaAnswer;
use portfolio_insights_core::models::narrative::TextualInsights;
use portfolio_insights_core::schema::Validate;

fn apple() -> serde_json::Value {
    json!({
        "name": "Apple Inc.",
        "symbol": "AAPL",
        "category": "Stock",
        "quantity": 10,
        "purchasePrice": 150.5,
        "currentPrice": 190.25
    })
}

// ═══════════════════════════════════════════════════════════════════
// ParsedPortfolio
// ═══════════════════════════════════════════════════════════════════

mod portfolio {
    use super::*;

    #[test]
    fn test_valid_portfolio() {
        let value = json!({ "assets": [
            apple(),
            { "name": "Bitcoin", "symbol": "BTC", "category": "Crypto",
              "quantity": 0.25, "purchasePrice": 30000, "currentPrice": 60000 },
            { "name": "Downtown Flat", "symbol": "FLAT1", "category": "Real Estate",
              "quantity": 1, "purchasePrice": 250000, "currentPrice": 275000 }
        ]});
        let portfolio = ParsedPortfolio::validate(&value).unwrap();

        assert_eq!(portfolio.len(), 3);
        assert_eq!(
            portfolio.assets[0],
            ParsedAsset::new("Apple Inc.", "AAPL", AssetCategory::Stock, 10.0, 150.5, 190.25)
        );
        assert_eq!(portfolio.assets[1].category, AssetCategory::Crypto);
        assert_eq!(portfolio.assets[2].category, AssetCategory::RealEstate);
    }

    #[test]
    fn test_empty_asset_list_is_valid() {
        let portfolio = ParsedPortfolio::validate(&json!({ "assets": [] })).unwrap();
        assert!(portfolio.is_empty());
    }

    #[test]
    fn test_missing_category_defaults_to_other() {
        let mut value = apple();
        value.as_object_mut().unwrap().remove("category");
        let asset = ParsedAsset::validate(&value).unwrap();
        assert_eq!(asset.category, AssetCategory::Other);

        let mut value = apple();
        value["category"] = json!(null);
        let asset = ParsedAsset::validate(&value).unwrap();
        assert_eq!(asset.category, AssetCategory::Other);
    }

    #[test]
    fn test_real_estate_alias() {
        let mut value = apple();
        value["category"] = json!("RealEstate");
        let asset = ParsedAsset::validate(&value).unwrap();
        assert_eq!(asset.category, AssetCategory::RealEstate);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut value = apple();
        value["category"] = json!("Bond");
        let err = ParsedAsset::validate(&value).unwrap_err();

        assert_eq!(err.field, "category");
        assert!(err.expected.contains("Real Estate"));
        assert_eq!(err.found, "string \"Bond\"");
    }

    #[test]
    fn test_numeric_string_not_coerced() {
        let mut second = apple();
        second["quantity"] = json!("10");
        let value = json!({ "assets": [apple(), second] });
        let err = ParsedPortfolio::validate(&value).unwrap_err();

        assert_eq!(err.field, "assets[1].quantity");
        assert_eq!(err.expected, "finite number");
        assert_eq!(err.found, "string \"10\"");
    }

    #[test]
    fn test_missing_field_reported() {
        let mut value = apple();
        value.as_object_mut().unwrap().remove("currentPrice");
        let err = ParsedPortfolio::validate(&json!({ "assets": [value] })).unwrap_err();

        assert_eq!(err.field, "assets[0].currentPrice");
        assert_eq!(err.found, "missing");
    }

    #[test]
    fn test_null_field_treated_as_missing() {
        let mut value = apple();
        value["purchasePrice"] = json!(null);
        let err = ParsedAsset::validate(&value).unwrap_err();

        assert_eq!(err.field, "purchasePrice");
        assert_eq!(err.found, "missing");
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut value = apple();
        value["name"] = json!("   ");
        let err = ParsedAsset::validate(&value).unwrap_err();

        assert_eq!(err.field, "name");
        assert_eq!(err.expected, "non-empty string");
    }

    #[test]
    fn test_strings_are_trimmed() {
        let mut value = apple();
        value["symbol"] = json!("  AAPL ");
        let asset = ParsedAsset::validate(&value).unwrap();
        assert_eq!(asset.symbol, "AAPL");
    }

    #[test]
    fn test_extra_fields_dropped() {
        let mut value = apple();
        value["sector"] = json!("Technology");
        value["totalValue"] = json!(1902.5);
        let asset = ParsedAsset::validate(&value).unwrap();

        let round = serde_json::to_value(&asset).unwrap();
        assert!(round.get("sector").is_none());
        assert!(round.get("totalValue").is_none());
    }

    #[test]
    fn test_root_must_be_object() {
        let err = ParsedPortfolio::validate(&json!([apple()])).unwrap_err();
        assert_eq!(err.field, "<root>");
        assert_eq!(err.expected, "object");
        assert_eq!(err.found, "array of 1 items");
    }

    #[test]
    fn test_assets_must_be_array() {
        let err = ParsedPortfolio::validate(&json!({ "assets": apple() })).unwrap_err();
        assert_eq!(err.field, "assets");
        assert_eq!(err.expected, "array");

        let err = ParsedPortfolio::validate(&json!({})).unwrap_err();
        assert_eq!(err.field, "assets");
        assert_eq!(err.found, "missing");
    }

    #[test]
    fn test_asset_must_be_object() {
        let err = ParsedPortfolio::validate(&json!({ "assets": [apple(), "AAPL"] })).unwrap_err();
        assert_eq!(err.field, "assets[1]");
        assert_eq!(err.expected, "object");
    }

    #[test]
    fn test_overflowing_product_rejected() {
        let mut huge = apple();
        huge["quantity"] = json!(1e200);
        huge["currentPrice"] = json!(1e200);
        let err = ParsedPortfolio::validate(&json!({ "assets": [apple(), huge] })).unwrap_err();

        assert_eq!(err.field, "assets[1].quantity");
        assert_eq!(err.expected, "values whose products and totals are finite");
    }

    #[test]
    fn test_overflowing_total_rejected() {
        let mut big = apple();
        big["quantity"] = json!(1.5e154);
        big["purchasePrice"] = json!(1.0);
        big["currentPrice"] = json!(1e154);
        assert!(ParsedAsset::validate(&big).is_ok());

        let err = ParsedPortfolio::validate(&json!({ "assets": [big.clone(), big] })).unwrap_err();
        assert_eq!(err.field, "assets");
        assert_eq!(err.found, "totals out of range");
    }

    #[test]
    fn test_large_finite_values_accepted() {
        let mut rich = apple();
        rich["quantity"] = json!(1e9);
        rich["currentPrice"] = json!(1e12);
        let portfolio = ParsedPortfolio::validate(&json!({ "assets": [rich] })).unwrap();
        assert!((portfolio.assets[0].current_value() - 1e21).abs() < 1e6);
    }

    #[test]
    fn test_output_schema() {
        let schema = ParsedPortfolio::output_schema();
        assert_eq!(schema["required"], json!(["assets"]));

        let item = &schema["properties"]["assets"]["items"];
        assert_eq!(
            item["properties"]["category"]["enum"],
            json!(["Stock", "Crypto", "Real Estate"])
        );
        let required = item["required"].as_array().unwrap();
        assert!(!required.contains(&json!("category")));
        assert!(required.contains(&json!("purchasePrice")));
    }
}

// ═══════════════════════════════════════════════════════════════════
// TextualInsights
// ═══════════════════════════════════════════════════════════════════

mod narrative {
    use super::*;

    #[test]
    fn test_valid_narrative() {
        let value = json!({
            "insights": ["Crypto dominates.", "Stocks are flat.", "Real estate is steady."],
            "forecast": "  Expect volatility.  "
        });
        let narrative = TextualInsights::validate(&value).unwrap();

        assert_eq!(narrative.insights.len(), 3);
        assert_eq!(narrative.forecast, "Expect volatility.");
    }

    #[test]
    fn test_list_markers_stripped() {
        let value = json!({
            "insights": ["- Crypto dominates.", "2. Stocks are flat.", "• Real estate is steady.", "3) Cash is low."],
            "forecast": "Expect volatility."
        });
        let narrative = TextualInsights::validate(&value).unwrap();

        assert_eq!(
            narrative.insights,
            vec![
                "Crypto dominates.",
                "Stocks are flat.",
                "Real estate is steady.",
                "Cash is low."
            ]
        );
    }

    #[test]
    fn test_en_dash_marker_stripped() {
        let value = json!({
            "insights": ["– Crypto dominates.", "Stocks are flat.", "Real estate is steady."],
            "forecast": "Expect volatility."
        });
        let narrative = TextualInsights::validate(&value).unwrap();
        assert_eq!(narrative.insights[0], "Crypto dominates.");
    }

    #[test]
    fn test_signed_figures_keep_their_sign() {
        let value = json!({
            "insights": [
                "–25% is the return on Bitcoin.",
                "-5% is the return on Tesla.",
                "Apple gained 20%."
            ],
            "forecast": "Steady."
        });
        let narrative = TextualInsights::validate(&value).unwrap();

        assert_eq!(narrative.insights[0], "–25% is the return on Bitcoin.");
        assert_eq!(narrative.insights[1], "-5% is the return on Tesla.");
    }

    #[test]
    fn test_numbers_inside_text_kept() {
        let value = json!({
            "insights": ["2024 was strong.", "10% sits in crypto.", "One asset lost money."],
            "forecast": "Steady."
        });
        let narrative = TextualInsights::validate(&value).unwrap();
        assert_eq!(narrative.insights[0], "2024 was strong.");
        assert_eq!(narrative.insights[1], "10% sits in crypto.");
    }

    #[test]
    fn test_too_few_insights() {
        let value = json!({ "insights": ["One.", "Two."], "forecast": "Steady." });
        let err = TextualInsights::validate(&value).unwrap_err();

        assert_eq!(err.field, "insights");
        assert_eq!(err.expected, "array of 3-5 non-empty strings");
        assert_eq!(err.found, "array of 2 items");
    }

    #[test]
    fn test_too_many_insights() {
        let value = json!({
            "insights": ["1", "2", "3", "4", "5", "6"],
            "forecast": "Steady."
        });
        let err = TextualInsights::validate(&value).unwrap_err();
        assert_eq!(err.found, "array of 6 items");
    }

    #[test]
    fn test_blank_insight_rejected() {
        let value = json!({ "insights": ["One.", "   ", "Three."], "forecast": "Steady." });
        let err = TextualInsights::validate(&value).unwrap_err();

        assert_eq!(err.field, "insights[1]");
        assert_eq!(err.expected, "non-empty string");
    }

    #[test]
    fn test_non_string_insight_rejected() {
        let value = json!({ "insights": ["One.", 2, "Three."], "forecast": "Steady." });
        let err = TextualInsights::validate(&value).unwrap_err();
        assert_eq!(err.field, "insights[1]");
        assert_eq!(err.found, "number 2");
    }

    #[test]
    fn test_missing_forecast() {
        let value = json!({ "insights": ["One.", "Two.", "Three."] });
        let err = TextualInsights::validate(&value).unwrap_err();
        assert_eq!(err.field, "forecast");
        assert_eq!(err.found, "missing");
    }

    #[test]
    fn test_output_schema_bounds() {
        let schema = TextualInsights::output_schema();
        assert_eq!(schema["properties"]["insights"]["minItems"], json!(3));
        assert_eq!(schema["properties"]["insights"]["maxItems"], json!(5));
    }
}

// ═══════════════════════════════════════════════════════════════════
// QaAnswer
// ═══════════════════════════════════════════════════════════════════

mod answer {
    use super::*;

    #[test]
    fn test_valid_answer() {
        let answer = QaAnswer::validate(&json!({ "answer": " Your total value is $1,200. " })).unwrap();
        assert_eq!(answer.answer, "Your total value is $1,200.");
    }

    #[test]
    fn test_empty_answer_rejected() {
        let err = QaAnswer::validate(&json!({ "answer": "" })).unwrap_err();
        assert_eq!(err.field, "answer");
        assert_eq!(err.found, "string \"\"");
    }

    #[test]
    fn test_answer_must_be_string() {
        let err = QaAnswer::validate(&json!({ "answer": ["a", "b"] })).unwrap_err();
        assert_eq!(err.found, "array of 2 items");
    }

    #[test]
    fn test_error_display() {
        let err = QaAnswer::validate(&json!({ "reply": "hi" })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Schema validation failed at `answer`: expected non-empty string, found missing"
        );
    }
}
