//! Command presenter: what to show the operator while pending

use crate::error::{InteractionError, PresentError};
use crate::interaction::{CommandMessage, HermitInteraction, MessageContext};
use crate::mode::ScanMode;

/// Ask the interaction for the Hermit command prompt.
///
/// Refuses without calling the interaction unless `mode` is pending.
pub fn present<I>(interaction: &I, mode: ScanMode) -> Result<CommandMessage, PresentError>
where
    I: HermitInteraction + ?Sized,
{
    if mode != ScanMode::Pending {
        return Err(PresentError::NotPending(mode));
    }

    interaction
        .message_for(&MessageContext::hermit_command())
        .map_err(|e| match e {
            InteractionError::Configuration(msg) | InteractionError::Parse(msg) => {
                PresentError::Configuration(msg)
            }
        })
}
