//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Every section is optional; an empty file yields the defaults.
//!
//! # Example
//!
//! ```no_run
//! use solarsizer::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::solver::SolverConfig;
use crate::domain::{ParameterOverrides, ParameterSet};
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Solver selection, timeout and concurrency cap.
    #[serde(default)]
    pub solver: SolverConfig,

    /// Overrides applied on top of the built-in parameter defaults.
    #[serde(default)]
    pub parameters: ParameterOverrides,
}

impl Config {
    /// Parse and validate configuration from TOML text.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_toml(&content)
    }

    /// Load `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Parameter set after applying the configured overrides to the defaults.
    #[must_use]
    pub fn parameters(&self) -> ParameterSet {
        ParameterSet::merged(&self.parameters)
    }

    pub fn init_logging(&self) {
        self.logging.init();
    }

    fn validate(&self) -> Result<()> {
        self.logging.validate()?;
        self.solver.validate()?;
        self.parameters().validate()?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::InvalidValue {
                field: "config",
                reason: e.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.solver.primary, "highs");
        assert_eq!(config.solver.fallback, "microlp");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.parameters(), ParameterSet::default());
    }

    #[test]
    fn parameter_overrides_merge_shallowly() {
        let config = Config::parse_toml(
            r#"
            [parameters]
            peak_price = 0.7

            [parameters.solar_installation_sizes]
            "5" = 0.1
            "#,
        )
        .unwrap();
        let params = config.parameters();
        assert_eq!(params.peak_price, 0.7);
        assert_eq!(params.off_peak_price, 0.4);
        assert_eq!(params.solar_installation_sizes.sizes().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn non_integer_size_key_is_rejected() {
        let result = Config::parse_toml(
            r#"
            [parameters.solar_installation_sizes]
            "large" = 0.1
            "#,
        );
        assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
    }

    #[test]
    fn negative_price_is_rejected() {
        let result = Config::parse_toml(
            r#"
            [parameters]
            off_peak_price = -1.0
            "#,
        );
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "off_peak_price",
                ..
            }))
        ));
    }

    #[test]
    fn renders_back_to_toml() {
        let config = Config::default();
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("primary = \"highs\""));
        assert_eq!(Config::parse_toml(&rendered).unwrap(), config);
    }
}
