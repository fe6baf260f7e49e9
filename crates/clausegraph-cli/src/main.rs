//! Clausegraph CLI - extract clauses from legal documents.

use anyhow::Context;
use clap::Parser;
use clausegraph_cli::{commands, Cli, Command, Config, Formatter};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays clean JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let formatter = Formatter::new(!cli.no_color && config.settings.color);
    let registry = commands::load_registry(&cli.schemas).context("failed to load document types")?;

    match cli.command {
        Command::Extract(args) => {
            let input = args.input.display().to_string();
            commands::execute_extract(args, &config, registry, &formatter)
                .await
                .with_context(|| format!("extraction of {} failed", input))?;
        }
        Command::Schemas(args) => {
            commands::execute_schemas(args, &registry, &formatter)?;
        }
    }

    Ok(())
}
