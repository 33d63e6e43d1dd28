//! Logging configuration and initialization.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ConfigError;

const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `"json"` or `"pretty"`.
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// `RUST_LOG` takes precedence over the configured level. Logs go to
    /// stderr so command output on stdout stays machine readable. A second
    /// call is a no-op.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let _ = match self.format.as_str() {
            "json" => fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
            _ => fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
        };
    }

    /// Copy of this config with the level raised by `verbose` steps or
    /// lowered to errors only when `quiet` is set.
    #[must_use]
    pub fn with_verbosity(&self, verbose: u8, quiet: bool) -> Self {
        let level = if quiet {
            "error".to_string()
        } else if verbose == 0 {
            self.level.clone()
        } else {
            let current = LEVELS
                .iter()
                .position(|l| l.eq_ignore_ascii_case(&self.level))
                .unwrap_or(3);
            LEVELS[(current + usize::from(verbose)).min(LEVELS.len() - 1)].to_string()
        };
        Self {
            level,
            format: self.format.clone(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !LEVELS.iter().any(|l| l.eq_ignore_ascii_case(&self.level)) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level",
                reason: format!("unknown level `{}`", self.level),
            });
        }
        if !matches!(self.format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected `json` or `pretty`, got `{}`", self.format),
            });
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}
