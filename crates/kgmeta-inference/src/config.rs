//! Suggestion backend configuration.
//!
//! Configuration can be loaded from:
//! - a TOML file with an `[inference]` table (`${VAR}` placeholders are
//!   substituted from the environment)
//! - environment variables (`KGMETA_*`, plus `OPENAI_API_KEY`)
//!
//! # Example
//!
//! ```rust,no_run
//! use kgmeta_inference::config::InferenceConfig;
//!
//! let config = InferenceConfig::load(None).expect("Failed to load config");
//! let config = InferenceConfig::from_file(std::path::Path::new("kgmeta.toml")).expect("Failed to load");
//! let config = InferenceConfig::from_env();
//! ```

use std::env;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use kgmeta_core::defaults;

#[cfg(feature = "openai")]
use crate::openai::OpenAIConfig;

/// Environment variable names.
pub const ENV_BASE_URL: &str = "KGMETA_OPENAI_BASE_URL";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_MODEL: &str = "KGMETA_SUGGEST_MODEL";
pub const ENV_TEMPERATURE: &str = "KGMETA_SUGGEST_TEMPERATURE";
pub const ENV_MAX_TOKENS: &str = "KGMETA_SUGGEST_MAX_TOKENS";
pub const ENV_TIMEOUT: &str = "KGMETA_SUGGEST_TIMEOUT";

static ENV_PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env placeholder regex"));

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for kgmeta_core::Error {
    fn from(e: ConfigError) -> Self {
        kgmeta_core::Error::Config(e.to_string())
    }
}

/// Settings for the OpenAI-compatible suggestion backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub base_url: String,
    /// API key; optional for local OpenAI-compatible servers.
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OPENAI_BASE_URL.to_string(),
            api_key: None,
            model: defaults::SUGGEST_MODEL.to_string(),
            temperature: defaults::SUGGEST_TEMPERATURE,
            max_tokens: defaults::SUGGEST_MAX_TOKENS,
            timeout_seconds: defaults::SUGGEST_TIMEOUT_SECS,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

impl InferenceConfig {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let fallback = Self::default();
        let config = Self {
            base_url: env::var(ENV_BASE_URL).unwrap_or(fallback.base_url),
            api_key: env::var(ENV_API_KEY).ok().filter(|k| !k.trim().is_empty()),
            model: env::var(ENV_MODEL).unwrap_or(fallback.model),
            temperature: env_parse(ENV_TEMPERATURE).unwrap_or(fallback.temperature),
            max_tokens: env_parse(ENV_MAX_TOKENS).unwrap_or(fallback.max_tokens),
            timeout_seconds: env_parse(ENV_TIMEOUT).unwrap_or(fallback.timeout_seconds),
        };
        debug!(
            base_url = %config.base_url,
            model = %config.model,
            has_api_key = config.api_key.is_some(),
            "Loaded inference config from environment"
        );
        config
    }

    /// Load from a TOML file with an `[inference]` table.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), model = %config.model, "Loaded inference config from file");
        Ok(config)
    }

    /// Parse TOML content, substituting `${VAR}` placeholders first.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            inference: InferenceConfig,
        }

        let content = Self::substitute_env_vars(content);
        let root: TomlRoot = toml::from_str(&content)?;
        let mut config = root.inference;
        if config.api_key.as_deref().is_some_and(|k| k.trim().is_empty() || k.starts_with("${")) {
            config.api_key = None;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise from the environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let config = Self::from_env();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Validation("base_url cannot be empty".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Validation("model cannot be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Validation(format!(
                "temperature must be between 0.0 and 2.0, got: {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Validation("max_tokens must be positive".to_string()));
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::Validation("timeout_seconds must be positive".to_string()));
        }
        Ok(())
    }

    /// Backend settings derived from this configuration.
    #[cfg(feature = "openai")]
    pub fn openai_config(&self) -> OpenAIConfig {
        OpenAIConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout_seconds: self.timeout_seconds,
        }
    }

    /// Replace `${VAR}` with the variable's value; unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = InferenceConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tokens, 4000);
        assert!(config.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution_with_value() {
        let content = "api_key = \"${KGMETA_TEST_SUBSTITUTION_VAR}\"";
        env::set_var("KGMETA_TEST_SUBSTITUTION_VAR", "test-value");
        let result = InferenceConfig::substitute_env_vars(content);
        env::remove_var("KGMETA_TEST_SUBSTITUTION_VAR");
        assert_eq!(result, "api_key = \"test-value\"");
    }

    #[test]
    fn test_env_var_substitution_missing() {
        let content = "api_key = \"${KGMETA_NONEXISTENT_VAR_12345}\"";
        let result = InferenceConfig::substitute_env_vars(content);
        assert_eq!(result, content);
    }

    #[test]
    fn test_toml_partial_table_uses_defaults() {
        let toml = r#"
[inference]
base_url = "http://localhost:11434/v1"
model = "llama3"
"#;
        let config = InferenceConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.model, "llama3");
        assert_eq!(config.max_tokens, 4000);
    }

    #[test]
    fn test_unresolved_api_key_placeholder_dropped() {
        let toml = r#"
[inference]
api_key = "${KGMETA_UNSET_KEY_98765}"
"#;
        let config = InferenceConfig::from_toml_str(toml).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad_url = InferenceConfig {
            base_url: "localhost:8080".into(),
            ..Default::default()
        };
        assert!(matches!(bad_url.validate(), Err(ConfigError::Validation(_))));

        let bad_temp = InferenceConfig {
            temperature: 3.5,
            ..Default::default()
        };
        assert!(bad_temp.validate().is_err());

        let no_model = InferenceConfig {
            model: " ".into(),
            ..Default::default()
        };
        assert!(no_model.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[inference]\nmodel = \"gpt-4o\"\ntemperature = 0.5").unwrap();
        let config = InferenceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.temperature, 0.5);
    }

    #[test]
    fn test_from_file_missing() {
        let result = InferenceConfig::from_file(Path::new("/nonexistent/kgmeta.toml"));
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }
}
