use clap::Parser;
use solarsizer::cli::command::Cli;
use solarsizer::cli::{self, output, EXIT_FAILURE};
use tracing::error;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let args = Cli::parse();
    let code = match cli::run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Command failed");
            output::error(&e.to_string());
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}
