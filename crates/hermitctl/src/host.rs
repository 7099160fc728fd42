//! Session assembly shared by the TUI and headless hosts
//!
//! Lifecycle hooks keep the host's payload slot in step with the session: filled
//! on success, emptied on every clear.

use crate::config::HermitConfig;
use crate::interaction::{Payload, PayloadInteraction};
use hermit_common::{capture_channel, CaptureAdapter, DeliveryReceiver, ScanSession, SessionHooks};
use std::sync::{Arc, Mutex};
use tracing::info;

pub type HostSession<A> = ScanSession<PayloadInteraction, A>;

/// Last successful payload, as seen by the host
#[derive(Debug, Clone, Default)]
pub struct PayloadSlot {
    inner: Arc<Mutex<Option<Payload>>>,
}

impl PayloadSlot {
    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Payload>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self) -> Option<Payload> {
        self.lock().clone()
    }

    pub fn take(&self) -> Option<Payload> {
        self.lock().take()
    }

    fn set(&self, payload: Payload) {
        *self.lock() = Some(payload);
    }

    fn clear(&self) {
        self.lock().take();
    }
}

/// Session wired to `adapter`, with hooks feeding a [`PayloadSlot`]
pub fn build_session<A: CaptureAdapter>(
    config: &HermitConfig,
    adapter: A,
) -> (HostSession<A>, DeliveryReceiver, PayloadSlot) {
    let (tx, rx) = capture_channel();
    let slot = PayloadSlot::default();

    let on_success = slot.clone();
    let on_clear = slot.clone();
    let hooks = SessionHooks::new()
        .on_start(|| info!("Waiting for Hermit QR code"))
        .on_success(move |payload: Payload| on_success.set(payload))
        .on_clear(move || on_clear.clear());

    let session = ScanSession::new(config.interaction(), adapter, tx)
        .with_options(config.session_options())
        .with_hooks(hooks);

    (session, rx, slot)
}
