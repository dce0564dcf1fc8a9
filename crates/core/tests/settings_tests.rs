// ═══════════════════════════════════════════════════════════════════
// Settings Tests — defaults, JSON loading, environment overlay,
// prompt templates
// ═══════════════════════════════════════════════════════════════════

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use portfolio_insights_core::errors::CoreError;
use portfolio_insights_core::models::settings::{ProviderKind, Settings, DEFAULT_TIMEOUT_SECS};
use portfolio_insights_core::prompts::{
    PromptLibrary, PromptTemplate, VAR_CALCULATED_INSIGHTS, VAR_CONTEXT_DATA, VAR_PORTFOLIO_DATA,
    VAR_QUESTION,
};

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

// ═══════════════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════════════

mod loading {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.provider, ProviderKind::Gemini);
        assert_eq!(settings.effective_model(), "gemini-2.0-flash");
        assert_eq!(settings.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(settings.api_key().is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let settings = Settings::from_json(r#"{ "provider": "openai" }"#).unwrap();
        assert_eq!(settings.provider, ProviderKind::OpenAi);
        assert_eq!(settings.effective_model(), "gpt-4o-mini");
        assert_eq!(settings.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(settings.prompts, PromptLibrary::default());
    }

    #[test]
    fn test_full_json() {
        let json = r#"{
            "provider": "gemini",
            "model": "gemini-1.5-pro",
            "api_keys": { "gemini": "g-key" },
            "base_url": "http://localhost:9000",
            "request_timeout_secs": 15
        }"#;
        let settings = Settings::from_json(json).unwrap();

        assert_eq!(settings.effective_model(), "gemini-1.5-pro");
        assert_eq!(settings.api_key(), Some("g-key"));
        assert_eq!(settings.base_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(settings.request_timeout_secs, 15);
    }

    #[test]
    fn test_invalid_json() {
        let err = Settings::from_json("{ provider: ").unwrap_err();
        assert!(matches!(err, CoreError::Config(msg) if msg.starts_with("Invalid settings JSON")));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(matches!(
            Settings::from_json(r#"{ "provider": "claude" }"#),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(matches!(
            Settings::from_json(r#"{ "request_timeout_secs": 0 }"#),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_blank_model_rejected() {
        assert!(matches!(
            Settings::from_json(r#"{ "model": "  " }"#),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "provider": "openai", "api_keys": {{ "openai": "sk-test" }} }}"#).unwrap();

        let settings = Settings::load_from_file(file.path()).unwrap();
        assert_eq!(settings.provider, ProviderKind::OpenAi);
        assert_eq!(settings.api_key(), Some("sk-test"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load_from_file(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CoreError::Config(msg) if msg.contains("nope.json")));
    }

    #[test]
    fn test_settings_roundtrip() {
        let mut settings = Settings::default();
        settings.model = Some("gpt-4o".into());
        let json = serde_json::to_string(&settings).unwrap();
        let back = Settings::from_json(&json).unwrap();
        assert_eq!(back.model.as_deref(), Some("gpt-4o"));
        assert_eq!(back.prompts, settings.prompts);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Environment overlay
// ═══════════════════════════════════════════════════════════════════

mod environment {
    use super::*;

    #[test]
    fn test_keys_from_env() {
        let mut settings = Settings::default();
        settings
            .apply_env_from(env(&[("GEMINI_API_KEY", "g"), ("OPENAI_API_KEY", "o")]))
            .unwrap();

        assert_eq!(settings.api_keys.get("gemini").map(String::as_str), Some("g"));
        assert_eq!(settings.api_keys.get("openai").map(String::as_str), Some("o"));
    }

    #[test]
    fn test_google_key_fallback() {
        let mut settings = Settings::default();
        settings.apply_env_from(env(&[("GOOGLE_API_KEY", "google")])).unwrap();
        assert_eq!(settings.api_key(), Some("google"));

        let mut settings = Settings::default();
        settings
            .apply_env_from(env(&[("GOOGLE_API_KEY", "google"), ("GEMINI_API_KEY", "gemini")]))
            .unwrap();
        assert_eq!(settings.api_key(), Some("gemini"));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut settings =
            Settings::from_json(r#"{ "api_keys": { "gemini": "from-file" }, "model": "a" }"#).unwrap();
        settings
            .apply_env_from(env(&[
                ("GEMINI_API_KEY", "from-env"),
                ("PORTFOLIO_INSIGHTS_MODEL", "b"),
            ]))
            .unwrap();

        assert_eq!(settings.api_key(), Some("from-env"));
        assert_eq!(settings.effective_model(), "b");
    }

    #[test]
    fn test_blank_values_ignored() {
        let mut settings = Settings::from_json(r#"{ "api_keys": { "gemini": "kept" } }"#).unwrap();
        settings
            .apply_env_from(env(&[("GEMINI_API_KEY", "  "), ("PORTFOLIO_INSIGHTS_PROVIDER", "")]))
            .unwrap();

        assert_eq!(settings.api_key(), Some("kept"));
        assert_eq!(settings.provider, ProviderKind::Gemini);
    }

    #[test]
    fn test_provider_from_env() {
        let mut settings = Settings::default();
        settings
            .apply_env_from(env(&[("PORTFOLIO_INSIGHTS_PROVIDER", "OpenAI")]))
            .unwrap();
        assert_eq!(settings.provider, ProviderKind::OpenAi);

        let mut settings = Settings::default();
        let err = settings
            .apply_env_from(env(&[("PORTFOLIO_INSIGHTS_PROVIDER", "mistral")]))
            .unwrap_err();
        assert!(matches!(err, CoreError::Config(msg) if msg.contains("mistral")));
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!(" Google ".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert!("azure".parse::<ProviderKind>().is_err());
        assert_eq!(ProviderKind::OpenAi.to_string(), "openai");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Prompt templates
// ═══════════════════════════════════════════════════════════════════

mod prompts {
    use super::*;

    #[test]
    fn test_builtin_placeholders() {
        let library = PromptLibrary::default();
        assert_eq!(library.parse_portfolio.placeholders(), vec![VAR_PORTFOLIO_DATA]);
        assert_eq!(
            library.textual_insights.placeholders(),
            vec![VAR_CALCULATED_INSIGHTS]
        );
        assert_eq!(
            library.portfolio_qa.placeholders(),
            vec![VAR_CONTEXT_DATA, VAR_QUESTION]
        );
    }

    #[test]
    fn test_builtin_temperatures() {
        let library = PromptLibrary::default();
        assert_eq!(library.parse_portfolio.temperature, Some(0.0));
        assert_eq!(library.textual_insights.temperature, Some(0.5));
        assert_eq!(library.portfolio_qa.temperature, None);
    }

    #[test]
    fn test_render() {
        let template = PromptTemplate::new("t", "Q: {{ question }} / {{question}}", None);
        let mut vars = BTreeMap::new();
        vars.insert("question".to_string(), "why?".to_string());

        assert_eq!(template.render(&vars).unwrap(), "Q: why? / why?");
        assert_eq!(template.placeholders(), vec!["question"]);
    }

    #[test]
    fn test_render_unknown_variable() {
        let template = PromptTemplate::new("t", "Hello {{name}}", None);
        let err = template.render(&BTreeMap::new()).unwrap_err();
        assert!(matches!(err, CoreError::Config(msg) if msg.contains("'name'")));
    }

    #[test]
    fn test_render_leaves_values_untouched() {
        let template = PromptTemplate::new("t", "Data: {{portfolio_data}}", None);
        let mut vars = BTreeMap::new();
        vars.insert("portfolio_data".to_string(), "{{not a placeholder}}".to_string());
        assert_eq!(template.render(&vars).unwrap(), "Data: {{not a placeholder}}");
    }

    #[test]
    fn test_prompt_override_from_settings() {
        let json = r#"{
            "prompts": {
                "portfolio_qa": { "name": "qa", "template": "{{context_data}} {{question}}", "temperature": 0.2 }
            }
        }"#;
        let settings = Settings::from_json(json).unwrap();

        assert_eq!(settings.prompts.portfolio_qa.name, "qa");
        assert_eq!(settings.prompts.portfolio_qa.temperature, Some(0.2));
        assert_eq!(
            settings.prompts.parse_portfolio,
            PromptLibrary::default().parse_portfolio
        );
    }

    #[test]
    fn test_invalid_prompt_rejected() {
        let empty = r#"{ "prompts": { "portfolio_qa": { "name": "qa", "template": "  " } } }"#;
        assert!(matches!(Settings::from_json(empty), Err(CoreError::Config(_))));

        let hot = r#"{ "prompts": { "portfolio_qa": { "name": "qa", "template": "{{question}}", "temperature": 3.5 } } }"#;
        assert!(matches!(Settings::from_json(hot), Err(CoreError::Config(_))));
    }
}
