//! Bridge from decoded QR text to a classified scan outcome

use crate::interaction::HermitInteraction;
use std::panic::{self, AssertUnwindSafe};

/// Result of interpreting one decoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome<T> {
    Success(T),
    Failure(String),
}

impl<T> ScanOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Success(_))
    }
}

/// Run the interaction's parser on `raw`.
///
/// Never panics and never returns an error: a parse error or a panicking parser
/// both come back as [`ScanOutcome::Failure`].
pub fn classify<I>(interaction: &I, raw: &str) -> ScanOutcome<I::Output>
where
    I: HermitInteraction + ?Sized,
{
    match panic::catch_unwind(AssertUnwindSafe(|| interaction.parse(raw))) {
        Ok(Ok(payload)) => ScanOutcome::Success(payload),
        Ok(Err(e)) => ScanOutcome::Failure(e.message().to_string()),
        Err(cause) => {
            let detail = panic_message(cause.as_ref());
            tracing::warn!("Interaction parser panicked: {}", detail);
            ScanOutcome::Failure(format!("parser panicked: {}", detail))
        }
    }
}

pub(crate) fn panic_message(cause: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = cause.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = cause.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InteractionError;
    use crate::interaction::{CommandMessage, MessageContext};

    struct Checksummed;

    impl HermitInteraction for Checksummed {
        type Output = u32;

        fn message_for(&self, _ctx: &MessageContext) -> Result<CommandMessage, InteractionError> {
            Err(InteractionError::Configuration("unused".into()))
        }

        fn parse(&self, raw: &str) -> Result<u32, InteractionError> {
            if raw == "explode" {
                panic!("segment table corrupt");
            }
            raw.parse::<u32>()
                .map_err(|_| InteractionError::Parse("bad checksum".into()))
        }
    }

    #[test]
    fn test_classify_success() {
        assert_eq!(classify(&Checksummed, "42"), ScanOutcome::Success(42));
    }

    #[test]
    fn test_classify_parse_failure() {
        assert_eq!(
            classify(&Checksummed, "garbage"),
            ScanOutcome::Failure("bad checksum".into())
        );
    }

    #[test]
    fn test_classify_contains_parser_panic() {
        let outcome = classify(&Checksummed, "explode");
        assert_eq!(
            outcome,
            ScanOutcome::Failure("parser panicked: segment table corrupt".into())
        );
        assert!(!outcome.is_success());
    }
}
