//! Engine configuration.
//!
//! # Responsibility
//! - Hold the knobs a host may set when constructing an engine.
//! - Load them from JSON with every field optional.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Engine construction options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Enables the buffered diagnostic log.
    pub debug: bool,
    /// When set, identities are `<prefix>-<n>` instead of random UUIDs; `n`
    /// comes from one process-wide counter per prefix.
    pub identity_prefix: Option<String>,
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(ConfigError::Parse)
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid engine config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EngineConfig;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = EngineConfig::from_json_str("{}").expect("empty object parses");
        assert_eq!(config, EngineConfig::default());
        assert!(!config.debug);
    }

    #[test]
    fn parses_all_fields() {
        let config = EngineConfig::from_json_str(r#"{"debug": true, "identity_prefix": "w"}"#)
            .expect("full config parses");
        assert!(config.debug);
        assert_eq!(config.identity_prefix.as_deref(), Some("w"));
    }

    #[test]
    fn rejects_wrong_types() {
        let err = EngineConfig::from_json_str(r#"{"debug": "yes"}"#)
            .expect_err("string debug flag must fail");
        assert!(err.to_string().contains("invalid engine config"));
    }
}
