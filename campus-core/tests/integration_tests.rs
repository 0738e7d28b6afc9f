//! Integration tests for campus-core infrastructure

use campus_core::{
    config_error, init_logging, not_found_error, CampusConfig, CampusError, ErrorContext,
    LogFormat, LoggingConfig, DEFAULT_BASE_URL,
};

#[test]
fn test_error_macros_carry_context() {
    let error = not_found_error!("courses/42/", "test_component");

    match &error {
        CampusError::NotFound { resource, context } => {
            assert_eq!(resource, "courses/42/");
            assert_eq!(context.component, "test_component");
            assert!(!context.error_id.is_empty());
            assert_eq!(context.recovery_suggestions.len(), 2);
        }
        _ => panic!("Expected NotFound error"),
    }
    assert_eq!(error.status(), Some(404));

    // Should not panic
    error.log();

    let config_error = config_error!("Invalid config", "test");
    assert!(!config_error.is_recoverable());
    assert!(config_error.status().is_none());
}

#[test]
fn test_context_builders() {
    let context = ErrorContext::new("api_client")
        .with_operation("send")
        .with_metadata("path", "courses/")
        .with_suggestion("Retry later");

    assert_eq!(context.operation.as_deref(), Some("send"));
    assert_eq!(context.metadata.get("path").map(String::as_str), Some("courses/"));
    assert_eq!(context.recovery_suggestions, vec!["Retry later".to_string()]);
}

#[test]
fn test_default_config_is_valid() {
    let config = CampusConfig::default();
    assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    assert!(config.api.timeout_seconds.is_none());
    assert!(!config.api.capture_auth_from_any_response);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_rejects_bad_values() {
    let mut config = CampusConfig::default();
    config.api.base_url = "not a url".to_string();
    assert!(matches!(config.validate(), Err(CampusError::Config { .. })));

    let mut config = CampusConfig::default();
    config.api.base_url = "ftp://backend/api/".to_string();
    assert!(config.validate().is_err());

    let mut config = CampusConfig::default();
    config.api.timeout_seconds = Some(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("campus.toml");

    let mut config = CampusConfig::default();
    config.api.base_url = "http://backend.local/api/".to_string();
    config.api.timeout_seconds = Some(15);
    config.logging.format = LogFormat::Json;
    config.save_to_file(&path).unwrap();

    let loaded = CampusConfig::from_file(&path).unwrap();
    assert_eq!(loaded.api.base_url, "http://backend.local/api/");
    assert_eq!(loaded.api.timeout_seconds, Some(15));
    assert_eq!(loaded.logging.format, LogFormat::Json);
}

#[test]
fn test_partial_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("campus.toml");
    std::fs::write(&path, "[api]\nbase_url = \"http://10.0.0.5:8000/api/\"\n").unwrap();

    let loaded = CampusConfig::from_file(&path).unwrap();
    assert_eq!(loaded.api.base_url, "http://10.0.0.5:8000/api/");
    assert!(!loaded.api.capture_auth_from_any_response);
    assert!(loaded.session.path.is_none());
    assert_eq!(loaded.logging.level, "warn");
}

#[test]
fn test_missing_config_file() {
    let result = CampusConfig::from_file("/definitely/not/here/campus.toml");
    assert!(matches!(result, Err(CampusError::Config { .. })));
}

#[tokio::test]
async fn test_logging_initialization() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Compact,
        filter_directives: vec!["campus_core=debug".to_string()],
        ..LoggingConfig::default()
    };

    // A global subscriber can only be installed once per process, so the
    // result is not asserted; the call must simply not panic.
    let _ = init_logging(&config);
}
