//! Assembler configuration.
//!
//! Holds the form defaults and the collaborator's generation parameters.
//! Values come from [`AssemblerConfig::default`], optionally overridden by a
//! YAML file and then by environment variables, and are checked once by
//! [`AssemblerConfig::validate`] before the assembler is built.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::input::FormDefaults;

/// Default chat model for the collaborator.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Configuration injected into [`crate::assembler::PromptAssembler`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    // Form defaults
    /// Values used for blank form fields.
    pub defaults: FormDefaults,

    // Collaborator settings
    /// Model identifier sent with every request.
    pub model: String,
    /// Sampling temperature (0.0 - 2.0).
    pub temperature: f64,
    /// Upper bound on generated tokens per section.
    pub max_tokens: u32,
    /// Seconds to wait for one section before falling back.
    pub timeout_secs: u64,
    /// Base URL of the chat-completions API.
    pub api_base: String,
    /// Bearer token for the API. Never read from config files.
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Skip the collaborator entirely and use templates only.
    pub offline: bool,

    // Cache settings
    /// Maximum cached results; 0 disables the cache.
    pub cache_entries: usize,
    /// Seconds a cached result stays valid.
    pub cache_ttl_secs: u64,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            defaults: FormDefaults::default(),

            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 2000,
            timeout_secs: 30,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            offline: false,

            cache_entries: 0,
            cache_ttl_secs: 3600, // 1 hour
        }
    }
}

impl AssemblerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a YAML configuration file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed, or if the
    /// resulting configuration does not validate.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Creates configuration from environment variables on top of the defaults.
    ///
    /// # Environment Variables
    ///
    /// - `PROMPT_FORGE_MODEL`: Model identifier (default: gpt-3.5-turbo)
    /// - `PROMPT_FORGE_TEMPERATURE`: Sampling temperature (default: 0.3)
    /// - `PROMPT_FORGE_MAX_TOKENS`: Token limit per section (default: 2000)
    /// - `PROMPT_FORGE_TIMEOUT_SECS`: Per-section timeout (default: 30)
    /// - `PROMPT_FORGE_API_BASE`: API base URL (default: https://api.openai.com/v1)
    /// - `PROMPT_FORGE_API_KEY` or `OPENAI_API_KEY`: API key (optional)
    /// - `PROMPT_FORGE_OFFLINE`: Templates only (default: false)
    /// - `PROMPT_FORGE_CACHE_ENTRIES`: Result cache size (default: 0, disabled)
    /// - `PROMPT_FORGE_CACHE_TTL_SECS`: Result cache TTL (default: 3600)
    /// - `PROMPT_FORGE_DEFAULT_AUDIENCE`, `PROMPT_FORGE_DEFAULT_TONE`,
    ///   `PROMPT_FORGE_DEFAULT_FORMAT`, `PROMPT_FORGE_DEFAULT_COMPLEXITY`:
    ///   form defaults
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().merge_vars(|key| std::env::var(key).ok())
    }

    /// Applies variable overrides from `lookup` and validates the result.
    pub fn merge_vars<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Collaborator settings
        if let Some(val) = lookup("PROMPT_FORGE_MODEL") {
            self.model = val;
        }

        if let Some(val) = lookup("PROMPT_FORGE_TEMPERATURE") {
            self.temperature = parse_env_value(&val, "PROMPT_FORGE_TEMPERATURE")?;
        }

        if let Some(val) = lookup("PROMPT_FORGE_MAX_TOKENS") {
            self.max_tokens = parse_env_value(&val, "PROMPT_FORGE_MAX_TOKENS")?;
        }

        if let Some(val) = lookup("PROMPT_FORGE_TIMEOUT_SECS") {
            self.timeout_secs = parse_env_value(&val, "PROMPT_FORGE_TIMEOUT_SECS")?;
        }

        if let Some(val) = lookup("PROMPT_FORGE_API_BASE") {
            self.api_base = val;
        }

        if let Some(val) = lookup("PROMPT_FORGE_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            if !val.trim().is_empty() {
                self.api_key = Some(val);
            }
        }

        if let Some(val) = lookup("PROMPT_FORGE_OFFLINE") {
            self.offline = parse_env_bool(&val, "PROMPT_FORGE_OFFLINE")?;
        }

        // Cache settings
        if let Some(val) = lookup("PROMPT_FORGE_CACHE_ENTRIES") {
            self.cache_entries = parse_env_value(&val, "PROMPT_FORGE_CACHE_ENTRIES")?;
        }

        if let Some(val) = lookup("PROMPT_FORGE_CACHE_TTL_SECS") {
            self.cache_ttl_secs = parse_env_value(&val, "PROMPT_FORGE_CACHE_TTL_SECS")?;
        }

        // Form defaults
        if let Some(val) = lookup("PROMPT_FORGE_DEFAULT_AUDIENCE") {
            self.defaults.audience = val;
        }

        if let Some(val) = lookup("PROMPT_FORGE_DEFAULT_TONE") {
            self.defaults.tone = val;
        }

        if let Some(val) = lookup("PROMPT_FORGE_DEFAULT_FORMAT") {
            self.defaults.format = parse_env_value(&val, "PROMPT_FORGE_DEFAULT_FORMAT")?;
        }

        if let Some(val) = lookup("PROMPT_FORGE_DEFAULT_COMPLEXITY") {
            self.defaults.complexity = parse_env_value(&val, "PROMPT_FORGE_DEFAULT_COMPLEXITY")?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.audience.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "default audience cannot be empty".to_string(),
            ));
        }

        if self.defaults.tone.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "default tone cannot be empty".to_string(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "model cannot be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationFailed(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !self.offline
            && !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://"))
        {
            return Err(ConfigError::ValidationFailed(format!(
                "api_base must be an http(s) URL, got '{}'",
                self.api_base
            )));
        }

        Ok(())
    }

    /// Per-section collaborator timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Lifetime of cached results.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Whether a live collaborator should be built from this configuration.
    pub fn wants_collaborator(&self) -> bool {
        !self.offline && self.api_key.is_some()
    }

    /// Builder method to set form defaults.
    pub fn with_defaults(mut self, defaults: FormDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Builder method to set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder method to set temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Builder method to set the per-section token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Builder method to set the per-section timeout. Sub-second remainders
    /// round up to the next whole second.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self
    }

    /// Builder method to set the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Builder method to set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Builder method to force template-only generation.
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Builder method to size the result cache.
    pub fn with_cache_entries(mut self, entries: usize) -> Self {
        self.cache_entries = entries;
        self
    }
}

/// Parse an environment variable value into a type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}

/// Parse an environment variable as a boolean.
fn parse_env_bool(value: &str, key: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected boolean value, got '{}'", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{OutputFormat, TaskComplexity};
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AssemblerConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!((config.temperature - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert!(config.api_key.is_none());
        assert!(!config.offline);
        assert_eq!(config.cache_entries, 0);
        assert!(!config.wants_collaborator());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = AssemblerConfig::new()
            .with_model("gpt-4o-mini")
            .with_temperature(0.7)
            .with_max_tokens(512)
            .with_timeout(Duration::from_secs(10))
            .with_api_base("http://localhost:4000")
            .with_api_key("sk-test")
            .with_cache_entries(16);

        assert_eq!(config.model, "gpt-4o-mini");
        assert!((config.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.api_base, "http://localhost:4000");
        assert_eq!(config.cache_entries, 16);
        assert!(config.wants_collaborator());
        assert!(!config.with_offline(true).wants_collaborator());
    }

    #[test]
    fn test_merge_vars_overrides() {
        let config = AssemblerConfig::default()
            .merge_vars(lookup_from(&[
                ("PROMPT_FORGE_MODEL", "gpt-4o"),
                ("PROMPT_FORGE_TEMPERATURE", "0.9"),
                ("PROMPT_FORGE_TIMEOUT_SECS", "5"),
                ("OPENAI_API_KEY", "sk-env"),
                ("PROMPT_FORGE_OFFLINE", "yes"),
                ("PROMPT_FORGE_DEFAULT_FORMAT", "email"),
                ("PROMPT_FORGE_DEFAULT_COMPLEXITY", "simple"),
                ("PROMPT_FORGE_DEFAULT_AUDIENCE", "new hires"),
            ]))
            .expect("valid overrides");

        assert_eq!(config.model, "gpt-4o");
        assert!((config.temperature - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.api_key.as_deref(), Some("sk-env"));
        assert!(config.offline);
        assert_eq!(config.defaults.format, OutputFormat::Email);
        assert_eq!(config.defaults.complexity, TaskComplexity::Simple);
        assert_eq!(config.defaults.audience, "new hires");
    }

    #[test]
    fn test_merge_vars_prefers_own_key() {
        let config = AssemblerConfig::default()
            .merge_vars(lookup_from(&[
                ("PROMPT_FORGE_API_KEY", "sk-own"),
                ("OPENAI_API_KEY", "sk-shared"),
            ]))
            .expect("valid overrides");
        assert_eq!(config.api_key.as_deref(), Some("sk-own"));
    }

    #[test]
    fn test_merge_vars_invalid_values() {
        let result =
            AssemblerConfig::default().merge_vars(lookup_from(&[("PROMPT_FORGE_MAX_TOKENS", "lots")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result =
            AssemblerConfig::default().merge_vars(lookup_from(&[("PROMPT_FORGE_OFFLINE", "maybe")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result = AssemblerConfig::default()
            .merge_vars(lookup_from(&[("PROMPT_FORGE_DEFAULT_FORMAT", "xml")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_with_timeout_rounds_up() {
        let config = AssemblerConfig::default().with_timeout(Duration::from_millis(500));
        assert_eq!(config.timeout_secs, 1);
        assert!(config.validate().is_ok());

        let config = AssemblerConfig::default().with_timeout(Duration::from_millis(1500));
        assert_eq!(config.timeout_secs, 2);

        let config = AssemblerConfig::default().with_timeout(Duration::from_secs(3));
        assert_eq!(config.timeout_secs, 3);

        let config = AssemblerConfig::default().with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_temperature() {
        let result = AssemblerConfig::default().with_temperature(3.0).validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("temperature"));
    }

    #[test]
    fn test_validation_empty_model() {
        let result = AssemblerConfig::default().with_model(" ").validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("model"));
    }

    #[test]
    fn test_validation_zero_timeout() {
        let result = AssemblerConfig::default()
            .with_timeout(Duration::from_millis(200))
            .validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_validation_bad_api_base() {
        let config = AssemblerConfig::default().with_api_base("api.openai.com");
        assert!(config.validate().is_err());
        assert!(config.with_offline(true).validate().is_ok());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "model: gpt-4o\nmax_tokens: 800\ncache_entries: 8\ndefaults:\n  tone: warm\n  format: list\n"
        )
        .expect("write config");

        let config = AssemblerConfig::from_yaml_file(file.path()).expect("valid config");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, 800);
        assert_eq!(config.cache_entries, 8);
        assert_eq!(config.defaults.tone, "warm");
        assert_eq!(config.defaults.format, OutputFormat::List);
        assert_eq!(config.defaults.audience, crate::input::DEFAULT_AUDIENCE);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_from_yaml_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "temperature: 5.0").expect("write config");

        let result = AssemblerConfig::from_yaml_file(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
    }
}
