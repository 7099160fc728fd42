//! Logging setup for hermitctl
//!
//! The TUI owns the terminal, so interactive runs log to a file; everything else
//! logs to stderr. `$HERMIT_LOG` takes an `EnvFilter` directive and wins over
//! `--verbose`.

use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "HERMIT_LOG";

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File,
}

/// Discover log file path with fallback chain
///
/// Priority:
/// 1. $HERMIT_LOG_FILE (explicit override)
/// 2. $XDG_STATE_HOME/hermit/hermitctl.log
/// 3. ~/.local/state/hermit/hermitctl.log
pub fn discover_log_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("HERMIT_LOG_FILE") {
        return Some(PathBuf::from(path));
    }

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg_state).join("hermit").join("hermitctl.log"));
    }

    dirs::home_dir().map(|home| home.join(".local/state/hermit/hermitctl.log"))
}

fn filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global subscriber
pub fn init(target: LogTarget, verbose: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(verbose));

    match target {
        LogTarget::Stderr => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow!("Failed to initialize logging: {}", e)),
        LogTarget::File => {
            let Some(path) = discover_log_path() else {
                // Nowhere to write and the terminal is taken: stay silent
                return Ok(());
            };
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
        }
    }
}
