//! wakecal entry point.

use std::process::ExitCode;

use clap::Parser;
use wakecal_core::{TracingConfig, init_tracing};

use wakecal_cli::cli::{Cli, Command, ConfigAction};
use wakecal_cli::commands;
use wakecal_cli::config::ClientConfig;
use wakecal_cli::error::ClientResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let path = commands::config::effective_path(cli.config.as_deref());
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };

    init_tracing(
        TracingConfig::for_verbosity(cli.debug || config.debug).with_format(config.logging.format),
    )?;

    match cli.subcommand() {
        Command::Run => commands::run::run(&config).await,
        Command::Fetch => commands::fetch::fetch(&config).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&path),
        },
    }
}
