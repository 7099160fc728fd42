//! Scan session - the state machine owned by the host
//!
//! The session holds the current mode and last error and is the only thing that
//! changes them. It owns the capture adapter for its whole life and guarantees the
//! adapter is active exactly while the mode is active: every exit from active
//! (success, error, cancel, failed activation, drop) releases it before any hook
//! runs.
//!
//! Capture events arrive as [`Delivery`] values through one channel. The host
//! drains that channel and feeds [`ScanSession::deliver`] one event at a time.

use crate::capture::{CaptureAdapter, CaptureEvent, CaptureSink, Delivery, DeliveryReceiver, DeliverySender};
use crate::error::PresentError;
use crate::hooks::SessionHooks;
use crate::interaction::{CommandMessage, HermitInteraction};
use crate::machine::{next_mode, Trigger};
use crate::mode::ScanMode;
use crate::parser::{classify, ScanOutcome};
use crate::presenter::present;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Transitions kept for display
pub const HISTORY_LIMIT: usize = 32;

const UNKNOWN_CAPTURE_ERROR: &str = "capture failed";
const UNKNOWN_PARSE_ERROR: &str = "unreadable response";

/// Display-only options. Neither affects transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Width of the capture preview, passed through to the adapter/renderer
    pub capture_width: String,

    /// Label of the start control
    pub start_label: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            capture_width: "256px".to_string(),
            start_label: "Scan".to_string(),
        }
    }
}

/// One applied transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: ScanMode,
    pub to: ScanMode,
    pub trigger: Trigger,
    pub at: DateTime<Utc>,
}

/// Why an input did not move the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Trigger has no edge from the current mode
    NotValidInMode(Trigger),
    /// Event from a capture that has already been released
    StaleCapture { generation: u64, current: u64 },
    /// Decoder reported an empty frame
    EmptyPayload,
}

/// What a call into the session did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Moved(TransitionRecord),
    Ignored { mode: ScanMode, reason: IgnoreReason },
}

impl Transition {
    pub fn is_moved(&self) -> bool {
        matches!(self, Transition::Moved(_))
    }

    /// Mode after the call
    pub fn mode(&self) -> ScanMode {
        match self {
            Transition::Moved(record) => record.to,
            Transition::Ignored { mode, .. } => *mode,
        }
    }
}

/// Activation bookkeeping, exposed for diagnostics and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptureStats {
    pub activations: u64,
    pub deactivations: u64,
}

/// Snapshot the renderer projects from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub mode: ScanMode,
    pub last_error: String,
    pub options: SessionOptions,
    pub last_transition: Option<TransitionRecord>,
}

pub struct ScanSession<I: HermitInteraction, A: CaptureAdapter> {
    id: Uuid,
    interaction: I,
    adapter: A,
    options: SessionOptions,
    hooks: SessionHooks<I::Output>,
    mode: ScanMode,
    last_error: String,
    generation: u64,
    sink: Option<CaptureSink>,
    tx: DeliverySender,
    history: VecDeque<TransitionRecord>,
    stats: CaptureStats,
}

impl<I: HermitInteraction, A: CaptureAdapter> ScanSession<I, A> {
    /// New session in pending mode. Capture events will be sent on `tx`.
    pub fn new(interaction: I, adapter: A, tx: DeliverySender) -> Self {
        Self {
            id: Uuid::new_v4(),
            interaction,
            adapter,
            options: SessionOptions::default(),
            hooks: SessionHooks::default(),
            mode: ScanMode::Pending,
            last_error: String::new(),
            generation: 0,
            sink: None,
            tx,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            stats: CaptureStats::default(),
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_hooks(mut self, hooks: SessionHooks<I::Output>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Empty unless the mode is error
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Generation of the current (or most recent) capture activation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_capturing(&self) -> bool {
        self.sink.is_some()
    }

    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    pub fn history(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.history.iter()
    }

    pub fn interaction(&self) -> &I {
        &self.interaction
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            mode: self.mode,
            last_error: self.last_error.clone(),
            options: self.options.clone(),
            last_transition: self.history.back().cloned(),
        }
    }

    /// Command prompt for the operator. Only answers while pending.
    pub fn instructions(&self) -> Result<CommandMessage, PresentError> {
        present(&self.interaction, self.mode)
    }

    /// Pending -> active. Activates the adapter; an activation failure lands in error.
    pub fn start(&mut self) -> Transition {
        let Some(record) = self.apply(Trigger::Start) else {
            return self.ignored(Trigger::Start);
        };

        self.last_error.clear();
        self.hooks.fire_start();

        self.generation += 1;
        let sink = CaptureSink::new(self.generation, self.tx.clone());
        self.sink = Some(sink.clone());
        self.stats.activations += 1;

        self.adapter.configure(&self.options);
        match self.adapter.activate(sink) {
            Ok(()) => {
                debug!(session = %self.id, generation = self.generation, "Capture activated");
                Transition::Moved(record)
            }
            Err(e) => {
                warn!(session = %self.id, "Capture activation failed: {}", e);
                self.fail(Trigger::CaptureFailed, e.message(), UNKNOWN_CAPTURE_ERROR)
            }
        }
    }

    /// Active -> pending, releasing the capture
    pub fn cancel(&mut self) -> Transition {
        if next_mode(self.mode, Trigger::Cancel).is_none() {
            return self.ignored(Trigger::Cancel);
        }

        self.release_capture();
        self.return_to_pending(Trigger::Cancel)
    }

    /// Success/error -> pending
    pub fn reset(&mut self) -> Transition {
        if next_mode(self.mode, Trigger::Reset).is_none() {
            return self.ignored(Trigger::Reset);
        }

        self.return_to_pending(Trigger::Reset)
    }

    /// Handle one capture event
    pub fn deliver(&mut self, delivery: Delivery) -> Transition {
        if self.sink.is_none() || delivery.generation != self.generation {
            debug!(
                session = %self.id,
                generation = delivery.generation,
                current = self.generation,
                "Ignoring stale capture event"
            );
            return Transition::Ignored {
                mode: self.mode,
                reason: IgnoreReason::StaleCapture {
                    generation: delivery.generation,
                    current: self.generation,
                },
            };
        }

        match delivery.event {
            CaptureEvent::Decoded(raw) if raw.is_empty() => Transition::Ignored {
                mode: self.mode,
                reason: IgnoreReason::EmptyPayload,
            },
            CaptureEvent::Decoded(raw) => match classify(&self.interaction, &raw) {
                ScanOutcome::Success(payload) => self.succeed(payload),
                ScanOutcome::Failure(message) => {
                    self.fail(Trigger::ScanRejected, message, UNKNOWN_PARSE_ERROR)
                }
            },
            CaptureEvent::CaptureFailure(message) => {
                self.fail(Trigger::CaptureFailed, message, UNKNOWN_CAPTURE_ERROR)
            }
        }
    }

    /// Feed everything currently queued on `rx`, in order
    pub fn drain(&mut self, rx: &mut DeliveryReceiver) -> Vec<Transition> {
        let mut out = Vec::new();
        while let Ok(delivery) = rx.try_recv() {
            out.push(self.deliver(delivery));
        }
        out
    }

    fn succeed(&mut self, payload: I::Output) -> Transition {
        self.release_capture();
        let Some(record) = self.apply(Trigger::ScanAccepted) else {
            return self.ignored(Trigger::ScanAccepted);
        };

        self.last_error.clear();
        self.hooks.fire_success(payload);
        Transition::Moved(record)
    }

    fn fail(&mut self, trigger: Trigger, message: String, fallback: &str) -> Transition {
        self.release_capture();
        let Some(record) = self.apply(trigger) else {
            return self.ignored(trigger);
        };

        self.last_error = if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        };
        info!(session = %self.id, "Scan failed: {}", self.last_error);
        self.hooks.fire_clear();
        Transition::Moved(record)
    }

    fn return_to_pending(&mut self, trigger: Trigger) -> Transition {
        let Some(record) = self.apply(trigger) else {
            return self.ignored(trigger);
        };

        self.last_error.clear();
        self.hooks.fire_clear();
        Transition::Moved(record)
    }

    /// Move along the table edge for `trigger`, if there is one
    fn apply(&mut self, trigger: Trigger) -> Option<TransitionRecord> {
        let to = next_mode(self.mode, trigger)?;
        let record = TransitionRecord {
            from: self.mode,
            to,
            trigger,
            at: Utc::now(),
        };

        info!(
            session = %self.id,
            from = %record.from,
            to = %record.to,
            trigger = %trigger,
            "Scan session transition"
        );

        self.mode = to;
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(record.clone());
        Some(record)
    }

    fn ignored(&self, trigger: Trigger) -> Transition {
        debug!(session = %self.id, mode = %self.mode, trigger = %trigger, "Ignoring trigger");
        Transition::Ignored {
            mode: self.mode,
            reason: IgnoreReason::NotValidInMode(trigger),
        }
    }

    fn release_capture(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.close();
            self.adapter.deactivate();
            self.stats.deactivations += 1;
            debug!(session = %self.id, generation = sink.generation(), "Capture released");
        }
    }
}

impl<I: HermitInteraction, A: CaptureAdapter> Drop for ScanSession<I, A> {
    fn drop(&mut self) {
        self.release_capture();
    }
}

/// Session behind a mutex, for hosts that deliver events from several threads
pub struct SharedSession<I: HermitInteraction, A: CaptureAdapter> {
    inner: Arc<Mutex<ScanSession<I, A>>>,
}

impl<I: HermitInteraction, A: CaptureAdapter> Clone for SharedSession<I, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I: HermitInteraction, A: CaptureAdapter> SharedSession<I, A> {
    pub fn new(session: ScanSession<I, A>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Exclusive access for the duration of one transition
    pub fn lock(&self) -> MutexGuard<'_, ScanSession<I, A>> {
        // A panic mid-transition cannot leave the mode half-written, so the
        // session behind a poisoned lock is still consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn start(&self) -> Transition {
        self.lock().start()
    }

    pub fn cancel(&self) -> Transition {
        self.lock().cancel()
    }

    pub fn reset(&self) -> Transition {
        self.lock().reset()
    }

    pub fn deliver(&self, delivery: Delivery) -> Transition {
        self.lock().deliver(delivery)
    }

    pub fn mode(&self) -> ScanMode {
        self.lock().mode()
    }

    pub fn view(&self) -> SessionView {
        self.lock().view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::capture_channel;
    use crate::error::{CaptureError, InteractionError};
    use crate::interaction::MessageContext;

    struct Numbers;

    impl HermitInteraction for Numbers {
        type Output = i64;

        fn message_for(&self, _ctx: &MessageContext) -> Result<CommandMessage, InteractionError> {
            Ok(CommandMessage {
                instructions: "type it".into(),
                command: "number".into(),
                mode: "wallet".into(),
            })
        }

        fn parse(&self, raw: &str) -> Result<i64, InteractionError> {
            raw.parse().map_err(|_| InteractionError::Parse(String::new()))
        }
    }

    #[derive(Default)]
    struct Idle {
        refuse: bool,
    }

    impl CaptureAdapter for Idle {
        fn activate(&mut self, _sink: CaptureSink) -> Result<(), CaptureError> {
            if self.refuse {
                return Err(CaptureError::Unavailable("no camera".into()));
            }
            Ok(())
        }

        fn deactivate(&mut self) {}
    }

    fn decoded(generation: u64, raw: &str) -> Delivery {
        Delivery {
            generation,
            event: CaptureEvent::Decoded(raw.to_string()),
        }
    }

    #[test]
    fn test_empty_parse_message_gets_fallback() {
        let (tx, _rx) = capture_channel();
        let mut session = ScanSession::new(Numbers, Idle::default(), tx);
        session.start();
        let t = session.deliver(decoded(1, "nope"));
        assert_eq!(t.mode(), ScanMode::Error);
        assert_eq!(session.last_error(), UNKNOWN_PARSE_ERROR);
    }

    #[test]
    fn test_activation_failure_lands_in_error() {
        let (tx, _rx) = capture_channel();
        let mut session = ScanSession::new(Numbers, Idle { refuse: true }, tx);
        let t = session.start();
        assert_eq!(t.mode(), ScanMode::Error);
        assert_eq!(session.last_error(), "capture unavailable: no camera");
        assert!(!session.is_capturing());
        assert_eq!(session.stats().activations, session.stats().deactivations);
    }

    #[test]
    fn test_empty_payload_is_not_an_event() {
        let (tx, _rx) = capture_channel();
        let mut session = ScanSession::new(Numbers, Idle::default(), tx);
        session.start();
        let t = session.deliver(decoded(1, ""));
        assert_eq!(
            t,
            Transition::Ignored {
                mode: ScanMode::Active,
                reason: IgnoreReason::EmptyPayload
            }
        );
        assert!(session.is_capturing());
    }

    #[test]
    fn test_history_is_bounded() {
        let (tx, _rx) = capture_channel();
        let mut session = ScanSession::new(Numbers, Idle::default(), tx);
        for _ in 0..HISTORY_LIMIT {
            session.start();
            session.cancel();
        }
        assert_eq!(session.history().count(), HISTORY_LIMIT);
        let last = session.view().last_transition.unwrap();
        assert_eq!(last.trigger, Trigger::Cancel);
        assert_eq!(last.to, ScanMode::Pending);
    }

    #[test]
    fn test_instructions_only_while_pending() {
        let (tx, _rx) = capture_channel();
        let mut session = ScanSession::new(Numbers, Idle::default(), tx);
        assert_eq!(session.instructions().unwrap().prompt_line(), "wallet> number");
        session.start();
        assert_eq!(
            session.instructions(),
            Err(PresentError::NotPending(ScanMode::Active))
        );
    }

    #[test]
    fn test_shared_session_serializes_calls() {
        let (tx, _rx) = capture_channel();
        let shared = SharedSession::new(ScanSession::new(Numbers, Idle::default(), tx));
        let handle = shared.clone();

        let worker = std::thread::spawn(move || {
            handle.start();
            handle.deliver(decoded(1, "12"))
        });
        let t = worker.join().unwrap();

        assert_eq!(t.mode(), ScanMode::Success);
        assert_eq!(shared.mode(), ScanMode::Success);
        assert_eq!(shared.reset().mode(), ScanMode::Pending);
    }
}
