//! Command execution for each subcommand

use crate::capture::build_adapter;
use crate::cli::{ConfigCommands, PromptArgs, ScanArgs};
use crate::config::HermitConfig;
use crate::errors::EXIT_SUCCESS;
use crate::{headless, tui};
use anyhow::{anyhow, Context, Result};
use hermit_common::{present, ScanMode};
use std::path::Path;
use tracing::info;

pub async fn scan(mut config: HermitConfig, args: &ScanArgs) -> Result<i32> {
    args.apply(&mut config);
    let adapter = build_adapter(&config.capture)?;
    info!(
        source = ?config.capture.source,
        format = %config.command.format,
        "Starting Hermit scan"
    );

    if args.headless {
        return headless::run(&config, adapter, args.json).await;
    }

    match tui::run(&config, adapter).await? {
        Some(payload) => {
            println!("{}", payload.render());
            Ok(EXIT_SUCCESS)
        }
        None => Ok(EXIT_SUCCESS),
    }
}

pub fn command(mut config: HermitConfig, args: &PromptArgs) -> Result<i32> {
    args.apply(&mut config);
    let message = present(&config.interaction(), ScanMode::Pending)
        .map_err(|e| anyhow!(e))
        .context("Cannot show the Hermit command")?;

    println!("{}", message.instructions);
    println!();
    println!("    {}", message.prompt_line());
    Ok(EXIT_SUCCESS)
}

pub fn config(config: &HermitConfig, explicit: Option<&Path>, action: &ConfigCommands) -> Result<i32> {
    match action {
        ConfigCommands::Show => {
            print!("{}", config.to_toml_string()?);
        }
        ConfigCommands::Path => match HermitConfig::resolve_path(explicit) {
            Some(path) => println!("{}", path.display()),
            None => println!("(defaults; no config file found)"),
        },
    }
    Ok(EXIT_SUCCESS)
}
