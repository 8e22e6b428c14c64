//! Application configuration.
//!
//! # Responsibility
//! - Load settings from an optional TOML file.
//! - Apply environment variable overrides on top.
//!
//! # Invariants
//! - A missing API key is not a configuration error; AI calls then fail with
//!   `AiError::MissingApiKey` and callers report "generation failed".

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_AI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_AI_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;
const DEFAULT_DB_FILE_NAME: &str = "clientboard.sqlite3";

const ENV_DB_PATH: &str = "CLIENTBOARD_DB_PATH";
const ENV_LOG_DIR: &str = "CLIENTBOARD_LOG_DIR";
const ENV_LOG_LEVEL: &str = "CLIENTBOARD_LOG_LEVEL";
const ENV_AI_MODEL: &str = "CLIENTBOARD_AI_MODEL";
const ENV_API_KEY: &str = "CLIENTBOARD_API_KEY";
const ENV_API_KEY_FALLBACK: &str = "API_KEY";

/// Configuration loading and validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, message: String },
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "cannot read config `{}`: {message}", path.display())
            }
            Self::Parse(message) => write!(f, "invalid config syntax: {message}"),
            Self::Invalid(message) => write!(f, "invalid config value: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Generative AI service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_AI_ENDPOINT.to_string(),
            model: DEFAULT_AI_MODEL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_AI_TIMEOUT_SECS,
        }
    }
}

/// Top-level application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Absolute directory for rolling log files; logging is off when unset.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub ai: AiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_dir: None,
            log_level: crate::logging::default_log_level().to_string(),
            ai: AiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file, then applies process environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus process environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`; blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENV_DB_PATH) {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = get(ENV_AI_MODEL) {
            self.ai.model = value;
        }
        if let Some(value) = get(ENV_API_KEY).or_else(|| get(ENV_API_KEY_FALLBACK)) {
            self.ai.api_key = Some(value);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path must not be empty".to_string()));
        }
        if !self.ai.endpoint.starts_with("http://") && !self.ai.endpoint.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "ai.endpoint must be an http(s) URL, got `{}`",
                self.ai.endpoint
            )));
        }
        if self.ai.model.trim().is_empty() {
            return Err(ConfigError::Invalid("ai.model must not be empty".to_string()));
        }
        if self.ai.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "ai.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, DEFAULT_AI_MODEL};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.ai.model, DEFAULT_AI_MODEL);
        assert!(config.ai.api_key.is_none());
    }

    #[test]
    fn toml_sections_override_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            db_path = "/var/lib/clientboard/board.db"
            log_level = "warn"

            [ai]
            model = "gemini-2.5-pro"
            timeout_secs = 15
            "#,
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/clientboard/board.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.ai.model, "gemini-2.5-pro");
        assert_eq!(config.ai.timeout_secs, 15);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = AppConfig::from_toml_str("[ai]\ntimeout_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn env_overrides_prefer_specific_api_key() {
        let vars = HashMap::from([
            ("CLIENTBOARD_API_KEY", "specific"),
            ("API_KEY", "generic"),
            ("CLIENTBOARD_LOG_LEVEL", "  "),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|value| value.to_string()));
        assert_eq!(config.ai.api_key.as_deref(), Some("specific"));
        assert_eq!(config.log_level, AppConfig::default().log_level);
    }
}
