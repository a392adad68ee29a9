use log::LevelFilter;
use voltport::config::LoggingConfig;
use voltport::logger::{get_log_file_path, parse_level, setup_logging};

#[test]
fn test_parse_level() {
    assert_eq!(parse_level("info").unwrap(), LevelFilter::Info);
    assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::Debug);
    assert!(parse_level("chatty").is_err());
}

#[test]
fn test_disabled_logging_installs_nothing() {
    let config = LoggingConfig::default();
    assert!(!config.enabled);
    assert!(setup_logging(&config).is_ok());
}

#[test]
fn test_invalid_level_is_rejected_when_enabled() {
    let config = LoggingConfig {
        enabled: true,
        level: "chatty".to_string(),
    };
    assert!(setup_logging(&config).is_err());
}

#[test]
fn test_log_file_path() {
    if let Ok(path) = get_log_file_path() {
        assert!(path.ends_with("voltport/voltport.log"));
    }
}
