//! CLI - Command-line argument parsing
//!
//! Keeps argument parsing separate from execution logic.

use crate::config::{CaptureSource, HermitConfig};
use crate::interaction::PayloadFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Hermit QR bridge
#[derive(Parser, Debug)]
#[command(name = "hermitctl")]
#[command(about = "Drive an air-gapped Hermit device through QR codes", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (overrides ~/.config/hermit/config.toml and /etc/hermit/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging (overridden by $HERMIT_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the Hermit command, scan the QR response and print the result
    Scan(ScanArgs),

    /// Print the Hermit command prompt and exit
    Command(PromptArgs),

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file in use
    Path,
}

/// Overrides for the `[command]` section
#[derive(Args, Debug, Default, Clone)]
pub struct PromptArgs {
    /// Hermit command the operator types
    #[arg(long = "command")]
    pub hermit_command: Option<String>,

    /// Hermit prompt mode shown before the command
    #[arg(long)]
    pub mode: Option<String>,

    /// Instructions shown above the command
    #[arg(long)]
    pub instructions: Option<String>,

    /// How to interpret the scanned response
    #[arg(long, value_enum)]
    pub format: Option<PayloadFormat>,
}

impl PromptArgs {
    pub fn apply(&self, config: &mut HermitConfig) {
        if let Some(command) = &self.hermit_command {
            config.command.command = command.clone();
        }
        if let Some(mode) = &self.mode {
            config.command.mode = mode.clone();
        }
        if let Some(instructions) = &self.instructions {
            config.command.instructions = instructions.clone();
        }
        if let Some(format) = self.format {
            config.command.format = format;
        }
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct ScanArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,

    /// Where decoded QR text comes from
    #[arg(long, value_enum)]
    pub source: Option<CaptureSource>,

    /// File polled by the file source
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Decoder command line for the process source
    #[arg(long)]
    pub decoder: Option<String>,

    /// Poll interval for the file source, in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Run without the terminal UI: start immediately and wait for one result
    #[arg(long)]
    pub headless: bool,

    /// Print the result as JSON (headless only)
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    pub fn apply(&self, config: &mut HermitConfig) {
        self.prompt.apply(config);
        if let Some(source) = self.source {
            config.capture.source = source;
        }
        if let Some(file) = &self.file {
            config.capture.file = Some(file.clone());
            if self.source.is_none() {
                config.capture.source = CaptureSource::File;
            }
        }
        if let Some(decoder) = &self.decoder {
            config.capture.decoder = decoder.clone();
        }
        if let Some(ms) = self.poll_interval_ms {
            config.capture.poll_interval_ms = ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_overrides() {
        let cli = Cli::try_parse_from([
            "hermitctl",
            "--verbose",
            "scan",
            "--command",
            "sign-psbt",
            "--format",
            "hex",
            "--file",
            "/tmp/qr.txt",
            "--headless",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };

        let mut config = HermitConfig::default();
        args.apply(&mut config);
        assert_eq!(config.command.command, "sign-psbt");
        assert_eq!(config.command.format, PayloadFormat::Hex);
        assert_eq!(config.capture.source, CaptureSource::File);
        assert!(args.headless);
    }

    #[test]
    fn test_explicit_source_wins_over_file() {
        let cli = Cli::try_parse_from([
            "hermitctl", "scan", "--file", "/tmp/qr.txt", "--source", "process",
        ])
        .unwrap();
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        let mut config = HermitConfig::default();
        args.apply(&mut config);
        assert_eq!(config.capture.source, CaptureSource::Process);
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["hermitctl", "--config", "x.toml", "config", "path"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Commands::Config { action: ConfigCommands::Path }));
    }
}
