//! Shared fixtures for hermit_common integration tests

#![allow(dead_code)]

use hermit_common::{
    CaptureAdapter, CaptureError, CaptureSink, CommandMessage, HermitInteraction,
    InteractionError, MessageContext, SessionHooks, SessionOptions,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Parsed payload produced by [`FakeInteraction`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signed {
    pub data: String,
}

/// Accepts payloads starting with "valid", rejects everything else with "bad checksum"
#[derive(Default, Clone)]
pub struct FakeInteraction {
    pub message_calls: Arc<AtomicUsize>,
    pub parse_calls: Arc<AtomicUsize>,
}

impl HermitInteraction for FakeInteraction {
    type Output = Signed;

    fn message_for(&self, ctx: &MessageContext) -> Result<CommandMessage, InteractionError> {
        self.message_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CommandMessage {
            instructions: format!("Run this on Hermit ({})", ctx.code),
            command: "sign-psbt".to_string(),
            mode: "wallet".to_string(),
        })
    }

    fn parse(&self, raw: &str) -> Result<Signed, InteractionError> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);
        if raw.starts_with("valid") {
            Ok(Signed { data: raw.to_string() })
        } else {
            Err(InteractionError::Parse("bad checksum".to_string()))
        }
    }
}

/// Adapter that hands its sink to the test so events can be pushed by hand
#[derive(Default, Clone)]
pub struct ManualAdapter {
    pub activations: Arc<AtomicUsize>,
    pub deactivations: Arc<AtomicUsize>,
    pub sink: Arc<Mutex<Option<CaptureSink>>>,
    /// Capture width seen by each `configure`, plus whether a sink was live then
    pub configured: Arc<Mutex<Vec<(String, bool)>>>,
}

impl ManualAdapter {
    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    pub fn deactivations(&self) -> usize {
        self.deactivations.load(Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.sink.lock().unwrap().is_some()
    }

    pub fn configured(&self) -> Vec<(String, bool)> {
        self.configured.lock().unwrap().clone()
    }

    /// Sink of the current activation
    pub fn current_sink(&self) -> CaptureSink {
        self.sink.lock().unwrap().clone().expect("adapter not active")
    }
}

impl CaptureAdapter for ManualAdapter {
    fn configure(&mut self, options: &SessionOptions) {
        let active = self.is_active();
        self.configured
            .lock()
            .unwrap()
            .push((options.capture_width.clone(), active));
    }

    fn activate(&mut self, sink: CaptureSink) -> Result<(), CaptureError> {
        self.activations.fetch_add(1, Ordering::SeqCst);
        *self.sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn deactivate(&mut self) {
        if self.sink.lock().unwrap().take().is_some() {
            self.deactivations.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Everything the hooks saw, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    Start,
    Success(Signed),
    Clear,
}

#[derive(Default, Clone)]
pub struct HookLog {
    calls: Arc<Mutex<Vec<HookCall>>>,
}

impl HookLog {
    pub fn hooks(&self) -> SessionHooks<Signed> {
        let start = self.calls.clone();
        let success = self.calls.clone();
        let clear = self.calls.clone();
        SessionHooks::new()
            .on_start(move || start.lock().unwrap().push(HookCall::Start))
            .on_success(move |p| success.lock().unwrap().push(HookCall::Success(p)))
            .on_clear(move || clear.lock().unwrap().push(HookCall::Clear))
    }

    pub fn calls(&self) -> Vec<HookCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &HookCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn clear_log(&self) {
        self.calls.lock().unwrap().clear();
    }
}
