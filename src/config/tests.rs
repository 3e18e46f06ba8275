//! Tests for config functionality.

use crate::config::types::default_strip_components;
use crate::config::{Config, config_template};
use crate::error::GenError;
use serial_test::serial;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.model, "gemini-2.0-flash");
    assert_eq!(config.api_key_env, "GEMINI_API_KEY");
    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.attempt_timeout_secs, 300);
    assert_eq!(config.cache_ttl_minutes, 60);
    assert_eq!(config.reasoning_tag, "Thinking");
    assert_eq!(config.state_dir, ".mdxgen");
    assert_eq!(config.output_base, "generated");
    assert!(config.prompt_source.is_none());
    assert!(config.required_paths.is_empty());
    assert!(!config.type_check.enabled);
    assert_eq!(config.type_check.command, "npx tsc --noEmit");
    assert_eq!(config.strip_components, default_strip_components());
}

#[test]
fn test_parse_empty_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
model: gemini-1.5-pro
max_attempts: 5
required_paths:
  - package.json
  - src/app/page.tsx
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.model, "gemini-1.5-pro");
    assert_eq!(config.max_attempts, 5);
    assert_eq!(config.required_paths, vec!["package.json", "src/app/page.tsx"]);

    // Unspecified values should use defaults
    assert_eq!(config.temperature, 0.7);
    assert_eq!(config.output_base, "generated");
}

#[test]
fn test_parse_nested_type_check_partial() {
    let yaml = r#"
type_check:
  enabled: true
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert!(config.type_check.enabled);
    assert_eq!(config.type_check.command, "npx tsc --noEmit");
    assert_eq!(config.type_check.applies_to, vec!["**/*.ts", "**/*.tsx"]);
}

#[test]
fn test_unknown_fields_ignored() {
    let yaml = r#"
model: gemini-2.0-flash
future_option: true
"#;
    assert!(Config::from_yaml(yaml).is_ok());
}

#[test]
fn test_invalid_yaml_is_user_error() {
    let err = Config::from_yaml("max_attempts: [not, a, number]").unwrap_err();
    assert!(matches!(err, GenError::UserError(_)));
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_zero_attempts_rejected() {
    let err = Config::from_yaml("max_attempts: 0").unwrap_err();
    assert!(err.to_string().contains("max_attempts must be greater than 0"));
}

#[test]
fn test_out_of_range_sampling_rejected() {
    assert!(Config::from_yaml("temperature: 3.5").is_err());
    assert!(Config::from_yaml("top_p: 1.5").is_err());
    assert!(Config::from_yaml("top_p: 1.0").is_ok());
}

#[test]
fn test_absolute_required_path_rejected() {
    let err = Config::from_yaml("required_paths: [\"/etc/passwd\"]").unwrap_err();
    assert!(err.to_string().contains("required_paths"));
}

#[test]
fn test_parent_dir_required_path_rejected() {
    let err = Config::from_yaml("required_paths: [\"../secrets.env\"]").unwrap_err();
    assert!(err.to_string().contains("required_paths"));
    assert!(Config::from_yaml("required_paths: [\"src/../x\"]").is_err());
    assert!(Config::from_yaml("required_paths: [\"./src/index.ts\"]").is_ok());
}

#[test]
fn test_zero_type_check_timeout_rejected() {
    let yaml = r#"
type_check:
  timeout_secs: 0
"#;
    let err = Config::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("type_check.timeout_secs must be greater than 0"));
}

#[test]
fn test_enabled_type_check_needs_command() {
    let yaml = r#"
type_check:
  enabled: true
  command: "  "
"#;
    assert!(Config::from_yaml(yaml).is_err());
}

#[test]
fn test_yaml_roundtrip_preserves_values() {
    let config = Config {
        model: "custom-model".to_string(),
        required_paths: vec!["Cargo.toml".to_string()],
        ..Default::default()
    };

    let yaml = config.to_yaml().unwrap();
    let parsed = Config::from_yaml(&yaml).unwrap();

    assert_eq!(parsed, config);
}

#[test]
fn test_template_parses_and_validates() {
    let config = Config::from_yaml(&config_template()).unwrap();
    assert_eq!(config.required_paths, vec!["package.json"]);
    assert!(!config.type_check.enabled);
}

#[test]
fn test_duration_helpers() {
    let config = Config {
        attempt_timeout_secs: 12,
        cache_ttl_minutes: 2,
        fetch_timeout_secs: 7,
        ..Default::default()
    };

    assert_eq!(config.attempt_timeout(), Duration::from_secs(12));
    assert_eq!(config.cache_ttl(), Duration::from_secs(120));
    assert_eq!(config.fetch_timeout(), Duration::from_secs(7));
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let err = Config::resolve(Some(&temp_dir.path().join("missing.yaml"))).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
#[serial]
fn test_resolve_without_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let _guard = crate::test_support::DirGuard::new(temp_dir.path());

    let config = Config::resolve(None).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_resolve_picks_up_default_file() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("mdxgen.yaml"), "max_attempts: 7\n").unwrap();
    let _guard = crate::test_support::DirGuard::new(temp_dir.path());

    let config = Config::resolve(None).unwrap();
    assert_eq!(config.max_attempts, 7);
}
