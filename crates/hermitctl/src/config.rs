//! Hermitctl configuration
//!
//! Config file: ~/.config/hermit/config.toml or /etc/hermit/config.toml
//!
//! ```toml
//! [display]
//! capture_width = "256px"
//! start_label = "Scan"
//!
//! [capture]
//! source = "process"
//! decoder = "zbarcam --raw --nodisplay --quiet"
//! poll_interval_ms = 300
//!
//! [command]
//! instructions = "Type the following command into Hermit:"
//! command = "display-xpub"
//! mode = "wallet"
//! format = "text"
//! ```

use crate::interaction::{PayloadFormat, PayloadInteraction};
use anyhow::{Context, Result};
use hermit_common::{SessionOptions, DEFAULT_POLL_INTERVAL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where decoded QR text comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    /// External decoder process printing one payload per line
    #[default]
    Process,
    /// File rewritten by an external decoder, polled at an interval
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Capture preview width ("256px", "40" columns)
    #[serde(default = "default_capture_width")]
    pub capture_width: String,

    /// Start control label
    #[serde(default = "default_start_label")]
    pub start_label: String,
}

fn default_capture_width() -> String {
    "256px".to_string()
}

fn default_start_label() -> String {
    "Scan".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            capture_width: default_capture_width(),
            start_label: default_start_label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default)]
    pub source: CaptureSource,

    /// Decoder command line for the process source
    #[serde(default = "default_decoder")]
    pub decoder: String,

    /// Watched file for the file source
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Poll cadence for the file source
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_decoder() -> String {
    "zbarcam --raw --nodisplay --quiet".to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: CaptureSource::default(),
            decoder: default_decoder(),
            file: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl CaptureConfig {
    /// Never zero; a zero interval would spin
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    #[serde(default = "default_instructions")]
    pub instructions: String,

    /// Literal Hermit command; must be set here or on the command line
    #[serde(default)]
    pub command: String,

    /// Hermit prompt mode shown before the command
    #[serde(default = "default_mode")]
    pub mode: String,

    #[serde(default)]
    pub format: PayloadFormat,
}

fn default_instructions() -> String {
    "Type the following command into Hermit:".to_string()
}

fn default_mode() -> String {
    "wallet".to_string()
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            instructions: default_instructions(),
            command: String::new(),
            mode: default_mode(),
            format: PayloadFormat::default(),
        }
    }
}

/// Main hermitctl configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HermitConfig {
    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub command: CommandConfig,
}

impl HermitConfig {
    /// ~/.config/hermit/config.toml
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hermit").join("config.toml"))
    }

    /// /etc/hermit/config.toml
    pub fn system_config_path() -> PathBuf {
        PathBuf::from("/etc/hermit/config.toml")
    }

    /// File that `load` would read, if any
    ///
    /// Priority:
    /// 1. Explicit path (must exist)
    /// 2. User config
    /// 3. System config
    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                return Some(user_path);
            }
        }

        let system_path = Self::system_config_path();
        if system_path.exists() {
            return Some(system_path);
        }

        None
    }

    /// Load configuration, falling back to defaults when no file exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match Self::resolve_path(explicit) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid hermitctl configuration")
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            capture_width: self.display.capture_width.clone(),
            start_label: self.display.start_label.clone(),
        }
    }

    pub fn interaction(&self) -> PayloadInteraction {
        PayloadInteraction::new(
            self.command.instructions.clone(),
            self.command.command.clone(),
            self.command.mode.clone(),
            self.command.format,
        )
    }
}
