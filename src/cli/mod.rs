//! Command-line interface.

pub mod command;
pub mod config;
pub mod optimize;
pub mod output;
pub mod solvers;

use std::path::Path;

use crate::domain::SolveStatus;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::infrastructure::factory;

use command::{Cli, Commands, ConfigCommand};
use output::OutputConfig;

/// Process exit code for errors.
pub const EXIT_FAILURE: i32 = 1;
/// Process exit code when the solver ran but found no optimal solution.
pub const EXIT_NOT_SOLVED: i32 = 2;

/// Dispatch a parsed command line and return the process exit code.
pub async fn run(cli: Cli) -> Result<i32> {
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    match &cli.command {
        Commands::Optimize(args) => {
            let config = Config::load_or_default(args.config.as_deref())?;
            init_logging(&config, &cli);
            let outcome = optimize::execute(args, &config).await?;
            Ok(if outcome.status == SolveStatus::Solved {
                0
            } else {
                EXIT_NOT_SOLVED
            })
        }
        Commands::Solvers => {
            init_logging(&Config::default(), &cli);
            solvers::list(&factory::build_registry())?;
            Ok(0)
        }
        Commands::Config(ConfigCommand::Init(args)) => {
            init_logging(&Config::default(), &cli);
            config::execute_init(&args.path, args.force)?;
            Ok(0)
        }
        Commands::Config(ConfigCommand::Show(args)) => {
            init_logging(&Config::default(), &cli);
            config::execute_show(args.config.as_deref())?;
            Ok(0)
        }
        Commands::Config(ConfigCommand::Validate(args)) => {
            init_logging(&Config::default(), &cli);
            config::execute_validate(args.config.as_deref())?;
            Ok(0)
        }
    }
}

fn init_logging(config: &Config, cli: &Cli) {
    config.logging.with_verbosity(cli.verbose, cli.quiet).init();
}

/// Path shown in messages for an optional config file.
#[must_use]
pub fn describe(path: Option<&Path>) -> String {
    path.map_or_else(|| "built-in defaults".to_string(), |p| p.display().to_string())
}
