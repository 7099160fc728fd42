//! Optional host callbacks fired on session transitions
//!
//! Firing rules:
//! - `on_start` once per pending -> active
//! - `on_success` once per active -> success, with the parsed payload
//! - `on_clear` once per transition into error and once per return to pending
//!
//! A panicking hook is logged and swallowed; the transition that fired it still
//! completes.

use crate::parser::panic_message;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

type StartHook = Box<dyn FnMut() + Send>;
type SuccessHook<T> = Box<dyn FnMut(T) + Send>;
type ClearHook = Box<dyn FnMut() + Send>;

pub struct SessionHooks<T> {
    on_start: Option<StartHook>,
    on_success: Option<SuccessHook<T>>,
    on_clear: Option<ClearHook>,
}

impl<T> Default for SessionHooks<T> {
    fn default() -> Self {
        Self {
            on_start: None,
            on_success: None,
            on_clear: None,
        }
    }
}

impl<T> std::fmt::Debug for SessionHooks<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHooks")
            .field("on_start", &self.on_start.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_clear", &self.on_clear.is_some())
            .finish()
    }
}

impl<T> SessionHooks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    pub fn on_success(mut self, hook: impl FnMut(T) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(hook));
        self
    }

    pub fn on_clear(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_clear = Some(Box::new(hook));
        self
    }

    pub(crate) fn fire_start(&mut self) {
        if let Some(hook) = self.on_start.as_mut() {
            guarded("on_start", || hook());
        }
    }

    pub(crate) fn fire_success(&mut self, payload: T) {
        if let Some(hook) = self.on_success.as_mut() {
            guarded("on_success", || hook(payload));
        }
    }

    pub(crate) fn fire_clear(&mut self) {
        if let Some(hook) = self.on_clear.as_mut() {
            guarded("on_clear", || hook());
        }
    }
}

fn guarded(name: &str, f: impl FnOnce()) {
    if let Err(cause) = panic::catch_unwind(AssertUnwindSafe(f)) {
        warn!("Session hook {} panicked: {}", name, panic_message(cause.as_ref()));
    }
}
