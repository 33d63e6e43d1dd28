//! Handler for the `config` command group.

use std::fs;
use std::path::Path;

use serde_json::json;

use crate::cli::output;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::Config;

/// Default config template with documentation.
const CONFIG_TEMPLATE: &str = include_str!("../../config.toml.example");

/// Execute `config init`.
pub fn execute_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, CONFIG_TEMPLATE)?;

    if output::is_json() {
        output::json_output(&json!({
            "command": "config.init",
            "path": path.display().to_string(),
        }));
        return Ok(());
    }

    output::success("Created configuration file");
    output::field("Path", path.display());
    output::hint(&format!("solarsizer optimize --config {}", path.display()));
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(path)?;
    let params = config.parameters();

    if output::is_json() {
        output::json_output(&json!({
            "command": "config.show",
            "logging": config.logging,
            "solver": config.solver,
            "parameters": params,
        }));
        return Ok(());
    }

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);

    output::section("Solver");
    output::field("Primary", &config.solver.primary);
    output::field("Fallback", &config.solver.fallback);
    output::field(
        "Timeout",
        config
            .solver
            .timeout()
            .map_or_else(|| "disabled".to_string(), |t| format!("{}s", t.as_secs())),
    );
    output::field("Max concurrent", config.solver.max_concurrent);

    output::section("Parameters");
    output::field("Peak price", format!("{} USD/kWh", params.peak_price));
    output::field("Off-peak price", format!("{} USD/kWh", params.off_peak_price));
    output::field("Battery cost", format!("{} USD/kWh", params.battery_cost_per_kw));
    output::field("Peak consumption", format!("{} kWh", params.peak_consumption));
    output::field("Off-peak consumption", format!("{} kWh", params.off_peak_consumption));
    let sizes: Vec<String> = params
        .solar_installation_sizes
        .iter()
        .map(|(size, cost)| format!("{size}={cost}"))
        .collect();
    output::field("Installation sizes", sizes.join(", "));
    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(path)?;
    let source = super::describe(path);

    if output::is_json() {
        output::json_output(&json!({
            "command": "config.validate",
            "source": source,
            "valid": true,
            "solver": config.solver.primary,
            "fallback": config.solver.fallback,
        }));
        return Ok(());
    }

    output::success("Configuration is valid");
    output::field("Source", source);
    Ok(())
}
