//! Capture adapters
//!
//! - process: external decoder (zbarcam) streaming payload lines
//! - file: file polled at the configured interval

mod file;
mod process;

pub use file::FileAdapter;
pub use process::ProcessAdapter;

use crate::config::{CaptureConfig, CaptureSource};
use anyhow::{Context, Result};
use hermit_common::CaptureAdapter;

/// Build the adapter selected by configuration
pub fn build_adapter(config: &CaptureConfig) -> Result<Box<dyn CaptureAdapter>> {
    match config.source {
        CaptureSource::Process => {
            let adapter = ProcessAdapter::from_command_line(&config.decoder)
                .map_err(anyhow::Error::new)
                .context("Invalid [capture].decoder")?;
            Ok(Box::new(adapter))
        }
        CaptureSource::File => {
            let path = config
                .file
                .clone()
                .context("File capture needs [capture].file or --file")?;
            Ok(Box::new(FileAdapter::new(path, config.poll_interval())))
        }
    }
}
