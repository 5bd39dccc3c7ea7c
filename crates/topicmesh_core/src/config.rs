//! Engine tuning knobs.
//!
//! # Invariants
//! - Every field has a default; an empty TOML document is a valid config.
//! - `search_default_limit <= search_max_limit` and both are non-zero.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Trimmed content shorter than this gets no suggestions.
    pub min_content_chars: usize,
    /// Trimmed search queries shorter than this return nothing.
    pub min_query_chars: usize,
    pub search_default_limit: u32,
    pub search_max_limit: u32,
    pub suggestion_limit: usize,
    /// Quiet period before a search request is issued.
    pub search_debounce_ms: u64,
    /// Quiet period before a suggestion request is issued.
    pub suggest_debounce_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_content_chars: 10,
            min_query_chars: 2,
            search_default_limit: 10,
            search_max_limit: 50,
            suggestion_limit: 8,
            search_debounce_ms: 300,
            suggest_debounce_ms: 1000,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_query_chars == 0 {
            return Err(ConfigError::Invalid(
                "min_query_chars must be at least 1".to_string(),
            ));
        }
        if self.search_max_limit == 0 {
            return Err(ConfigError::Invalid(
                "search_max_limit must be at least 1".to_string(),
            ));
        }
        if self.search_default_limit == 0 || self.search_default_limit > self.search_max_limit {
            return Err(ConfigError::Invalid(format!(
                "search_default_limit must be within 1..={}",
                self.search_max_limit
            )));
        }
        if self.suggestion_limit == 0 {
            return Err(ConfigError::Invalid(
                "suggestion_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn suggest_debounce(&self) -> Duration {
        Duration::from_millis(self.suggest_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EngineConfig};
    use std::time::Duration;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.suggest_debounce(), Duration::from_secs(1));
    }

    #[test]
    fn partial_document_overrides_selected_fields() {
        let config = EngineConfig::from_toml_str(
            "min_content_chars = 20\nsearch_max_limit = 25\n",
        )
        .unwrap();
        assert_eq!(config.min_content_chars, 20);
        assert_eq!(config.search_max_limit, 25);
        assert_eq!(config.search_default_limit, 10);
    }

    #[test]
    fn invalid_documents_are_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("search_default_limit = 80"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("min_query_chars = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("unknown_knob = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn config_file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topicmesh.toml");
        std::fs::write(&path, "suggestion_limit = 3\n").unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.suggestion_limit, 3);
    }
}
