//! Config load/save behavior

use formpilot_config::{Config, ConfigError};
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = Config::default();

    assert_eq!(config.defaults.model, "gpt-4o");
    assert_eq!(config.defaults.temperature, 0.2);
    assert_eq!(config.defaults.max_tokens, 4096);
    assert_eq!(config.defaults.max_tool_iterations, 10);
    assert!(!config.has_api_key());
    assert!(config.server_command().is_none());
}

#[tokio::test]
async fn test_load_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let config = Config::load_from(&path).await.unwrap();
    assert_eq!(config.default_model(), "gpt-4o");
    assert!(config.api_key().is_none());
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.openai.api_key = "sk-test".to_string();
    config.openai.api_base = Some("https://gateway.example.com/v1".to_string());
    config.defaults.model = "gpt-4o-mini".to_string();
    config.defaults.max_tool_iterations = 5;
    config.forms_server.command = "/opt/forms-mcp/index.js".to_string();
    config.forms_server.args = vec!["--quiet".to_string()];

    config.save_to(&path).await.unwrap();

    let loaded = Config::load_from(&path).await.unwrap();
    assert_eq!(loaded.api_key().as_deref(), Some("sk-test"));
    assert_eq!(
        loaded.api_base().as_deref(),
        Some("https://gateway.example.com/v1")
    );
    assert_eq!(loaded.default_model(), "gpt-4o-mini");
    assert_eq!(loaded.max_tool_iterations(), 5);
    assert_eq!(
        loaded.server_command().as_deref(),
        Some("/opt/forms-mcp/index.js")
    );
    assert_eq!(loaded.server_args(), vec!["--quiet".to_string()]);
}

#[tokio::test]
async fn test_partial_config_gets_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    std::fs::write(
        &path,
        r#"{"openai": {"api_key": "sk-partial"}}"#,
    )
    .unwrap();

    let config = Config::load_from(&path).await.unwrap();
    assert_eq!(config.api_key().as_deref(), Some("sk-partial"));
    assert_eq!(config.default_model(), "gpt-4o");
    assert_eq!(config.max_tool_iterations(), 10);
}

#[tokio::test]
async fn test_invalid_json_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    std::fs::write(&path, "{not json").unwrap();

    let result = Config::load_from(&path).await;
    assert!(matches!(result, Err(ConfigError::Json(_))));
}

#[test]
fn test_empty_strings_read_as_unset() {
    let mut config = Config::default();
    config.openai.api_key = String::new();
    config.forms_server.command = String::new();

    assert!(config.api_key().is_none());
    assert!(config.server_command().is_none());
}
