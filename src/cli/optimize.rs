//! Handler for the `optimize` command.

use std::path::Path;

use serde_json::json;

use crate::application::Optimization;
use crate::cli::command::OptimizeArgs;
use crate::cli::output;
use crate::domain::{ParameterOverrides, ParameterSet, SolarSizeTable, SolveStatus};
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::{Config, SolverConfig};
use crate::infrastructure::factory;

/// Execute the optimize command and return the outcome for exit-code mapping.
pub async fn execute(args: &OptimizeArgs, config: &Config) -> Result<Optimization> {
    let params = resolve_parameters(args, config)?;
    let solver = resolve_solver(args, &config.solver);
    let optimizer = factory::build_optimizer(&solver);

    output::header(env!("CARGO_PKG_VERSION"));
    let pb = output::spinner(&format!("Solving with {}", solver.primary));
    let outcome = match optimizer.optimize(&params).await {
        Ok(outcome) => outcome,
        Err(e) => {
            output::spinner_fail(&pb, "Optimization failed");
            return Err(e);
        }
    };
    if outcome.status == SolveStatus::Solved {
        output::spinner_success(&pb, "Optimal sizing found");
    } else {
        output::spinner_fail(&pb, &format!("Solver finished: {}", outcome.status));
    }

    print_outcome(&params, &outcome);
    Ok(outcome)
}

/// Defaults, then config file overrides, then `--params`, then flags.
pub fn resolve_parameters(args: &OptimizeArgs, config: &Config) -> Result<ParameterSet> {
    let mut overrides = config.parameters.clone();
    if let Some(path) = &args.params {
        overrides = overrides.overlay(read_params_file(path)?);
    }
    overrides = overrides.overlay(ParameterOverrides {
        peak_price: args.peak_price,
        off_peak_price: args.off_peak_price,
        battery_cost_per_kw: args.battery_cost,
        peak_consumption: args.peak_consumption,
        off_peak_consumption: args.off_peak_consumption,
        solar_installation_sizes: args
            .sizes
            .as_deref()
            .map(SolarSizeTable::parse_pairs)
            .transpose()?,
    });

    let params = ParameterSet::merged(&overrides);
    params.validate()?;
    Ok(params)
}

fn resolve_solver(args: &OptimizeArgs, base: &SolverConfig) -> SolverConfig {
    SolverConfig {
        primary: args.solver.clone().unwrap_or_else(|| base.primary.clone()),
        fallback: args.fallback.clone().unwrap_or_else(|| base.fallback.clone()),
        timeout_secs: args.timeout.unwrap_or(base.timeout_secs),
        max_concurrent: base.max_concurrent,
    }
}

fn read_params_file(path: &Path) -> Result<ParameterOverrides> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_outcome(params: &ParameterSet, outcome: &Optimization) {
    if output::is_json() {
        output::json_output(&json!({
            "command": "optimize",
            "status": outcome.status,
            "solver": outcome.solver,
            "objective": outcome.objective,
            "selected_size": outcome.selected_size,
            "summary": outcome.summary,
            "parameters": params,
        }));
        return;
    }

    output::field("Status", output::highlight(outcome.status));
    if let Some(solver) = outcome.solver {
        output::field("Solver", solver);
    }

    let Some(summary) = outcome.summary else {
        match outcome.status {
            SolveStatus::Infeasible => {
                output::hint("demand cannot be met; check the installation sizes and consumption");
            }
            SolveStatus::Timeout => output::hint("raise --timeout or use --timeout 0 to disable it"),
            _ => {}
        }
        return;
    };

    output::section("Recommended sizing");
    output::field("Solar capacity", format!("{:.2} kWh", summary.solar_capacity));
    output::field("Battery capacity", format!("{:.2} kWh", summary.battery_capacity));
    output::field(
        "Off-peak grid usage",
        format!("{:.2} kWh", summary.off_peak_grid_usage),
    );
    output::field(
        "Peak grid consumption",
        format!("{:.2} kWh", summary.peak_grid_consumption),
    );
    if let Some(cost) = outcome.objective {
        output::field("Total cost", output::highlight(format!("{cost:.3} USD")));
    }
    if let Some(size) = outcome.selected_size {
        output::field("Catalogue size", output::muted(format!("{size} kWh")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Write;

    #[test]
    fn flags_win_over_params_file_and_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"peak_price": 0.9, "peak_consumption": 12}}"#).unwrap();

        let config = Config::parse_toml("[parameters]\npeak_price = 0.7\noff_peak_price = 0.3\n").unwrap();
        let args = OptimizeArgs {
            params: Some(file.path().to_path_buf()),
            peak_consumption: Some(15.0),
            ..Default::default()
        };

        let params = resolve_parameters(&args, &config).unwrap();
        assert_eq!(params.peak_price, 0.9);
        assert_eq!(params.off_peak_price, 0.3);
        assert_eq!(params.peak_consumption, 15.0);
        assert_eq!(params.battery_cost_per_kw, 0.15);
    }

    #[test]
    fn params_file_size_keys_are_coerced() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"solar_installation_sizes": {{"5": 0.1, "150": 0.2}}}}"#).unwrap();
        let args = OptimizeArgs {
            params: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let params = resolve_parameters(&args, &Config::default()).unwrap();
        assert_eq!(
            params.solar_installation_sizes.sizes().collect::<Vec<_>>(),
            vec![5, 150]
        );
    }

    #[test]
    fn non_numeric_size_key_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"solar_installation_sizes": {{"big": 0.1}}}}"#).unwrap();
        let args = OptimizeArgs {
            params: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_parameters(&args, &Config::default()),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn malformed_sizes_flag_fails() {
        let args = OptimizeArgs {
            sizes: Some("5:0.1".into()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_parameters(&args, &Config::default()),
            Err(Error::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn solver_flags_override_config() {
        let args = OptimizeArgs {
            solver: Some("microlp".into()),
            timeout: Some(0),
            ..Default::default()
        };
        let solver = resolve_solver(&args, &SolverConfig::default());
        assert_eq!(solver.primary, "microlp");
        assert_eq!(solver.fallback, "microlp");
        assert_eq!(solver.timeout(), None);
    }
}
