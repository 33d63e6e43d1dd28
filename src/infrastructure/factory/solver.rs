//! Solver factory.
//!
//! Wires the solver registry, runner and optimizer from configuration.

use std::sync::Arc;

use crate::application::{Optimizer, SolverRegistry, SolverRunner};
use crate::infrastructure::config::SolverConfig;

/// Registry holding every backend compiled into this build.
#[must_use]
pub fn build_registry() -> Arc<SolverRegistry> {
    Arc::new(SolverRegistry::with_defaults())
}

/// Runner over the default registry with the configured timeout and cap.
#[must_use]
pub fn build_runner(config: &SolverConfig) -> Arc<SolverRunner> {
    Arc::new(SolverRunner::new(build_registry(), config.runner_settings()))
}

/// Optimizer using the configured primary and fallback backends.
#[must_use]
pub fn build_optimizer(config: &SolverConfig) -> Optimizer {
    Optimizer::new(build_runner(config), &config.primary, &config.fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn runner_carries_configured_limits() {
        let config = SolverConfig {
            timeout_secs: 5,
            max_concurrent: 3,
            ..Default::default()
        };
        let runner = build_runner(&config);
        assert_eq!(runner.settings().timeout, Some(Duration::from_secs(5)));
        assert_eq!(runner.settings().max_concurrent, 3);
        assert_eq!(runner.registry().len(), 2);
    }
}
