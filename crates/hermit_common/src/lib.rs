//! Hermit scan core
//!
//! State machine and handshake contract for driving an air-gapped Hermit device
//! through QR codes: show the operator a command, capture Hermit's QR response,
//! hand the decoded text to a protocol-specific interaction, and report the result.
//!
//! - [`session`]: the state machine (pending / active / success / error)
//! - [`machine`]: pure transition table
//! - [`presenter`]: command prompt derivation while pending
//! - [`parser`]: decoded text -> classified outcome
//! - [`capture`]: contract for camera-polling decoders
//! - [`hooks`]: optional host callbacks

pub mod capture;
pub mod error;
pub mod hooks;
pub mod interaction;
pub mod machine;
pub mod mode;
pub mod parser;
pub mod presenter;
pub mod session;

pub use capture::{
    capture_channel, CaptureAdapter, CaptureEvent, CaptureSink, Delivery, DeliveryReceiver,
    DeliverySender, DEFAULT_POLL_INTERVAL,
};
pub use error::{CaptureError, InteractionError, PresentError};
pub use hooks::SessionHooks;
pub use interaction::{CommandMessage, HermitInteraction, MessageContext, HERMIT_COMMAND_CODE};
pub use machine::Trigger;
pub use mode::{ScanMode, WalletState};
pub use parser::{classify, ScanOutcome};
pub use presenter::present;
pub use session::{
    CaptureStats, IgnoreReason, ScanSession, SessionOptions, SessionView, SharedSession,
    Transition, TransitionRecord,
};
