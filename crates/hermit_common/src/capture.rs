//! Capture collaborator contract
//!
//! A capture adapter polls a camera/decoder while activated and reports through a
//! [`CaptureSink`]. The sink is the only way events reach a session:
//!
//! - every event is stamped with the activation generation that produced it
//! - empty payloads are dropped, identical consecutive payloads fire once
//! - the first failure closes the sink
//! - once the session releases the capture, the sink is closed and drops everything

use crate::error::CaptureError;
use crate::session::SessionOptions;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Polling cadence used when the host does not configure one
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);

/// Something the capture collaborator saw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum CaptureEvent {
    /// Raw text decoded from a QR frame
    Decoded(String),
    /// Camera or decoder fault
    CaptureFailure(String),
}

/// A capture event tagged with the activation it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub generation: u64,
    pub event: CaptureEvent,
}

pub type DeliverySender = mpsc::UnboundedSender<Delivery>;
pub type DeliveryReceiver = mpsc::UnboundedReceiver<Delivery>;

/// Channel carrying capture events into the host's single entry point
pub fn capture_channel() -> (DeliverySender, DeliveryReceiver) {
    mpsc::unbounded_channel()
}

/// Handle given to an adapter on activation
#[derive(Debug, Clone)]
pub struct CaptureSink {
    generation: u64,
    tx: DeliverySender,
    open: Arc<AtomicBool>,
    last_decoded: Arc<Mutex<Option<String>>>,
}

impl CaptureSink {
    pub fn new(generation: u64, tx: DeliverySender) -> Self {
        Self {
            generation,
            tx,
            open: Arc::new(AtomicBool::new(true)),
            last_decoded: Arc::new(Mutex::new(None)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// False once the session released this capture or a failure was reported
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Report a decoded frame. Returns whether it was forwarded.
    pub fn decoded(&self, raw: &str) -> bool {
        if raw.is_empty() || !self.is_open() {
            return false;
        }

        {
            let mut last = self
                .last_decoded
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if last.as_deref() == Some(raw) {
                return false;
            }
            *last = Some(raw.to_string());
        }

        self.send(CaptureEvent::Decoded(raw.to_string()))
    }

    /// Report a camera/decoder fault. Closes the sink.
    pub fn failure(&self, message: impl Into<String>) -> bool {
        if !self.open.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.send(CaptureEvent::CaptureFailure(message.into()))
    }

    /// Report a typed capture error as the activation's one failure
    pub fn report(&self, error: CaptureError) -> bool {
        self.failure(error.message())
    }

    pub(crate) fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    fn send(&self, event: CaptureEvent) -> bool {
        self.tx
            .send(Delivery {
                generation: self.generation,
                event,
            })
            .is_ok()
    }
}

/// Camera-polling QR decoder
///
/// `activate` starts polling and must return promptly; results go to the sink.
/// `deactivate` must stop polling immediately and be safe to call repeatedly.
pub trait CaptureAdapter: Send {
    /// Display options for the next activation (preview width). Called before
    /// every `activate`.
    fn configure(&mut self, _options: &SessionOptions) {}

    fn activate(&mut self, sink: CaptureSink) -> Result<(), CaptureError>;

    fn deactivate(&mut self);
}

impl<T: CaptureAdapter + ?Sized> CaptureAdapter for Box<T> {
    fn configure(&mut self, options: &SessionOptions) {
        (**self).configure(options)
    }

    fn activate(&mut self, sink: CaptureSink) -> Result<(), CaptureError> {
        (**self).activate(sink)
    }

    fn deactivate(&mut self) {
        (**self).deactivate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut DeliveryReceiver) -> Vec<Delivery> {
        let mut out = Vec::new();
        while let Ok(d) = rx.try_recv() {
            out.push(d);
        }
        out
    }

    #[test]
    fn test_repeated_frames_fire_once() {
        let (tx, mut rx) = capture_channel();
        let sink = CaptureSink::new(3, tx);

        assert!(sink.decoded("abc"));
        assert!(!sink.decoded("abc"));
        assert!(!sink.decoded(""));
        assert!(sink.decoded("def"));

        let got = drain(&mut rx);
        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|d| d.generation == 3));
        assert_eq!(got[1].event, CaptureEvent::Decoded("def".into()));
    }

    #[test]
    fn test_failure_fires_once_and_closes() {
        let (tx, mut rx) = capture_channel();
        let sink = CaptureSink::new(1, tx);

        assert!(sink.failure("camera denied"));
        assert!(!sink.failure("camera denied again"));
        assert!(!sink.decoded("late"));
        assert!(!sink.is_open());

        let got = drain(&mut rx);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].event, CaptureEvent::CaptureFailure("camera denied".into()));
    }

    #[test]
    fn test_reported_error_is_the_failure() {
        let (tx, mut rx) = capture_channel();
        let sink = CaptureSink::new(2, tx);

        assert!(sink.report(CaptureError::Device("camera unplugged".into())));
        assert!(!sink.report(CaptureError::Unavailable("zbarcam".into())));
        assert!(!sink.is_open());

        let got = drain(&mut rx);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].event, CaptureEvent::CaptureFailure("camera unplugged".into()));
    }

    #[test]
    fn test_closed_sink_drops_everything() {
        let (tx, mut rx) = capture_channel();
        let sink = CaptureSink::new(1, tx);
        let adapter_copy = sink.clone();

        sink.close();
        assert!(!adapter_copy.decoded("payload"));
        assert!(!adapter_copy.failure("boom"));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&CaptureEvent::Decoded("xyz".into())).unwrap();
        assert_eq!(json, r#"{"kind":"decoded","text":"xyz"}"#);
    }
}
