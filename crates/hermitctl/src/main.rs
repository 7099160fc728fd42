//! Hermit Control - QR bridge to an air-gapped Hermit device

use anyhow::Result;
use clap::Parser;
use hermitctl::cli::{Cli, Commands};
use hermitctl::config::HermitConfig;
use hermitctl::errors::EXIT_GENERAL_ERROR;
use hermitctl::logging::{self, LogTarget};
use hermitctl::commands;

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            EXIT_GENERAL_ERROR
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let target = match &cli.command {
        Commands::Scan(args) if !args.headless => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    logging::init(target, cli.verbose)?;

    let config = HermitConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Scan(args) => commands::scan(config, args).await,
        Commands::Command(args) => commands::command(config, args),
        Commands::Config { action } => commands::config(&config, cli.config.as_deref(), action),
    }
}
