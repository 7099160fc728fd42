//! Scan modes and the wallet-library state vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;

/// The session's current phase. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Showing the command for the operator to type into Hermit
    #[default]
    Pending,
    /// Camera capture running, waiting for a QR response
    Active,
    /// Response parsed and handed to the host
    Success,
    /// Capture or parse failed; `last_error` holds the reason
    Error,
}

impl ScanMode {
    /// Success and Error only leave through an explicit reset
    pub fn is_settled(&self) -> bool {
        matches!(self, ScanMode::Success | ScanMode::Error)
    }

    /// Projection onto the wallet-library states the interaction understands
    pub fn wallet_state(&self) -> Option<WalletState> {
        match self {
            ScanMode::Pending => Some(WalletState::Pending),
            ScanMode::Active => Some(WalletState::Active),
            ScanMode::Success | ScanMode::Error => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Pending => "pending",
            ScanMode::Active => "active",
            ScanMode::Success => "success",
            ScanMode::Error => "error",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wallet-library interaction states. Only these two are consumed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletState {
    Pending,
    Active,
}

impl fmt::Display for WalletState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletState::Pending => f.write_str("pending"),
            WalletState::Active => f.write_str("active"),
        }
    }
}
