use clientboard_core::{AppConfig, ConfigError, GeminiClient};
use std::io::Write;
use std::path::PathBuf;

#[test]
fn toml_file_settings_reach_ai_client() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
db_path = "/srv/clientboard/board.db"
log_dir = "/var/log/clientboard"

[ai]
model = "gemini-2.5-flash"
api_key = "file-key"
"#
    )
    .unwrap();

    let mut config = AppConfig::from_toml_str(&std::fs::read_to_string(file.path()).unwrap())
        .unwrap();
    config.apply_overrides(|_| None);

    assert_eq!(config.db_path, PathBuf::from("/srv/clientboard/board.db"));
    assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/clientboard")));
    assert_eq!(config.ai.model, "gemini-2.5-flash");
    assert_eq!(config.ai.api_key.as_deref(), Some("file-key"));

    let client = GeminiClient::new(&config.ai).unwrap();
    assert_eq!(client.model(), "gemini-2.5-flash");
}

#[test]
fn load_reports_missing_file_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");

    let err = AppConfig::load(&path).unwrap_err();
    match err {
        ConfigError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn load_rejects_malformed_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "db_path = [unterminated").unwrap();

    let err = AppConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn generic_api_key_applies_when_dedicated_key_is_unset() {
    let mut config = AppConfig::default();
    config.apply_overrides(|key| match key {
        "API_KEY" => Some("fallback".to_string()),
        "CLIENTBOARD_DB_PATH" => Some("  ".to_string()),
        _ => None,
    });

    assert_eq!(config.ai.api_key.as_deref(), Some("fallback"));
    assert_eq!(config.db_path, AppConfig::default().db_path);
}
