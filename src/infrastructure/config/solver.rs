//! Solver selection and limits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::RunnerSettings;
use crate::error::ConfigError;

/// `[solver]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Backend tried first.
    pub primary: String,
    /// Backend tried when the primary is unavailable or crashes.
    pub fallback: String,
    /// Wall-clock limit per solve in seconds. `0` disables the limit.
    pub timeout_secs: u64,
    /// Maximum concurrent solver invocations.
    pub max_concurrent: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            primary: "highs".into(),
            fallback: "microlp".into(),
            timeout_secs: 30,
            max_concurrent: num_cpus::get(),
        }
    }
}

impl SolverConfig {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    #[must_use]
    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            timeout: self.timeout(),
            max_concurrent: self.max_concurrent,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.primary.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "solver.primary",
            });
        }
        if self.fallback.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "solver.fallback",
            });
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::InvalidValue {
                field: "solver.max_concurrent",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_disables_limit() {
        let config = SolverConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.timeout(), None);
        assert_eq!(SolverConfig::default().timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn concurrency_must_be_positive() {
        let config = SolverConfig {
            max_concurrent: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
