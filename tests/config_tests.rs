// Integration tests for configuration loading

use mock_interview::config::Config;
use mock_interview::session::SessionConfig;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent");

    let config = Config::load(path.to_str().unwrap()).unwrap();

    assert_eq!(config.service.name, "mock-interview");
    assert_eq!(config.generation.model, "gemini-2.0-flash");
    assert_eq!(config.generation.question_count, 5);
    assert_eq!(config.generation.credential_env, "GEMINI_API_KEY");
    assert_eq!(config.devices.attach_poll_interval_ms, 100);
    assert_eq!(config.devices.max_attach_attempts, 50);
    assert_eq!(config.devices.language, "en-US");
    assert_eq!(config.session.tick_interval_ms, 1000);
}

#[test]
fn test_file_values_override_defaults() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    write!(
        file,
        r#"
[generation]
model = "gemini-1.5-pro"
question_count = 3

[devices]
max_attach_attempts = 10
facing_mode = "environment"

[session]
tick_interval_ms = 250
"#
    )
    .unwrap();

    let config = Config::load(file.path().to_str().unwrap()).unwrap();

    assert_eq!(config.generation.model, "gemini-1.5-pro");
    assert_eq!(config.generation.question_count, 3);
    // Unset keys in a present section keep their defaults
    assert_eq!(config.generation.request_timeout_secs, 30);
    assert_eq!(config.devices.max_attach_attempts, 10);
    assert_eq!(config.devices.facing_mode, "environment");
    assert_eq!(config.devices.video_width, 1280);

    let session = SessionConfig::from(&config);
    assert_eq!(session.tick_interval, Duration::from_millis(250));
    assert_eq!(session.devices.max_attach_attempts, 10);
    assert_eq!(session.devices.video.facing_mode, "environment");
    assert!(session.session_id.starts_with("interview-"));
}

#[test]
fn test_invalid_value_is_an_error() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    write!(file, "[generation]\nquestion_count = \"many\"\n").unwrap();

    assert!(Config::load(file.path().to_str().unwrap()).is_err());
}

#[test]
fn test_empty_credential_counts_as_missing() {
    let mut config = Config::default().generation;
    config.credential_env = "MOCK_INTERVIEW_TEST_EMPTY_KEY".to_string();
    std::env::set_var(&config.credential_env, "  ");

    assert!(config.credential().is_none());
}

#[test]
fn test_zero_tick_interval_is_rejected() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    write!(file, "[session]\ntick_interval_ms = 0\n").unwrap();

    let err = Config::load(file.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{:#}", err).contains("tick_interval_ms"));
}

#[test]
fn test_zero_attach_poll_interval_is_rejected() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    write!(file, "[devices]\nattach_poll_interval_ms = 0\n").unwrap();

    let err = Config::load(file.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{:#}", err).contains("attach_poll_interval_ms"));
}
