//! Interaction contract between the scan core and a device protocol
//!
//! An interaction knows two things the core does not: which command the operator
//! must type into Hermit, and how to interpret the QR text Hermit answers with.
//! The core never constructs one; the host hands it in.

use crate::error::InteractionError;
use crate::mode::WalletState;
use serde::{Deserialize, Serialize};

/// Message code identifying the Hermit command prompt
pub const HERMIT_COMMAND_CODE: &str = "hermit.command";

/// Context passed to [`HermitInteraction::message_for`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContext {
    pub wallet_state: WalletState,
    pub code: String,
}

impl MessageContext {
    /// The only context the core ever asks for
    pub fn hermit_command() -> Self {
        Self {
            wallet_state: WalletState::Pending,
            code: HERMIT_COMMAND_CODE.to_string(),
        }
    }
}

/// What the operator sees while pending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMessage {
    /// Free-form instructions shown above the command
    pub instructions: String,

    /// Literal command to type into Hermit (also the copyable text)
    pub command: String,

    /// Hermit prompt mode the command is typed at, e.g. "wallet"
    pub mode: String,
}

impl CommandMessage {
    /// Prompt line as rendered on screen: `wallet> export-xpub`
    pub fn prompt_line(&self) -> String {
        format!("{}> {}", self.mode, self.command)
    }
}

/// Protocol-specific translator between wallet semantics and Hermit text
///
/// Implementations exist per device command. The core only calls `message_for`
/// while pending and `parse` on non-empty decoded text.
pub trait HermitInteraction: Send + Sync {
    /// Parsed response handed to the host untouched
    type Output: Send;

    /// Command and instructions for the given context.
    ///
    /// Errors here are configuration errors and are fatal to the host.
    fn message_for(&self, context: &MessageContext) -> Result<CommandMessage, InteractionError>;

    /// Interpret the raw text decoded from Hermit's QR code.
    ///
    /// Any error is recovered by the session into its error mode.
    fn parse(&self, raw: &str) -> Result<Self::Output, InteractionError>;
}

impl<T: HermitInteraction + ?Sized> HermitInteraction for Box<T> {
    type Output = T::Output;

    fn message_for(&self, context: &MessageContext) -> Result<CommandMessage, InteractionError> {
        (**self).message_for(context)
    }

    fn parse(&self, raw: &str) -> Result<Self::Output, InteractionError> {
        (**self).parse(raw)
    }
}
