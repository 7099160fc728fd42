//! Error types shared by the scan core.

use crate::mode::ScanMode;
use thiserror::Error;

/// Failures raised by a [`HermitInteraction`](crate::HermitInteraction)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InteractionError {
    /// The interaction object cannot serve the request at all (missing command,
    /// malformed context). Programmer error, never recovered.
    #[error("interaction misconfigured: {0}")]
    Configuration(String),

    /// The scanned payload does not satisfy the device's response grammar.
    #[error("{0}")]
    Parse(String),
}

impl InteractionError {
    /// Message shown to the operator, without any prefix
    pub fn message(&self) -> &str {
        match self {
            InteractionError::Configuration(msg) | InteractionError::Parse(msg) => msg,
        }
    }
}

/// Failures from [`present`](crate::presenter::present)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresentError {
    #[error("command prompt is only available while pending (current mode: {0})")]
    NotPending(ScanMode),

    #[error("interaction misconfigured: {0}")]
    Configuration(String),
}

/// Failures from a capture collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The decoder could not be started (binary missing, file unreadable)
    #[error("capture unavailable: {0}")]
    Unavailable(String),

    /// The camera or decoder failed while polling
    #[error("{0}")]
    Device(String),
}

impl CaptureError {
    pub fn message(&self) -> String {
        match self {
            CaptureError::Unavailable(msg) => format!("capture unavailable: {}", msg),
            CaptureError::Device(msg) => msg.clone(),
        }
    }
}
