//! Screen model and key mapping
//!
//! The screen is a projection of the session: nothing here is a source of truth.

use crate::host::{HostSession, PayloadSlot};
use crate::interaction::Payload;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hermit_common::{CaptureAdapter, CommandMessage, PresentError, ScanMode, SessionView};

/// Everything one frame needs
#[derive(Debug, Clone)]
pub struct ScreenModel {
    pub view: SessionView,
    /// Only present while pending
    pub prompt: Option<CommandMessage>,
    pub payload: Option<Payload>,
    pub show_help: bool,
}

impl ScreenModel {
    pub fn capture<A: CaptureAdapter>(
        session: &HostSession<A>,
        slot: &PayloadSlot,
        show_help: bool,
    ) -> Result<Self, PresentError> {
        let view = session.view();
        let prompt = if view.mode == ScanMode::Pending {
            Some(session.instructions()?)
        } else {
            None
        };

        Ok(Self {
            view,
            prompt,
            payload: slot.get(),
            show_help,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Start,
    Cancel,
    Reset,
    ToggleHelp,
    Quit,
    Nothing,
}

/// Keys offered in each mode; anything else does nothing
pub fn key_action(mode: ScanMode, key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => return KeyAction::Quit,
        (KeyCode::Char('q'), _) => return KeyAction::Quit,
        (KeyCode::Char('?'), _) | (KeyCode::F(1), _) => return KeyAction::ToggleHelp,
        _ => {}
    }

    match (mode, key.code) {
        (ScanMode::Pending, KeyCode::Enter) | (ScanMode::Pending, KeyCode::Char('s')) => {
            KeyAction::Start
        }
        (ScanMode::Active, KeyCode::Esc) => KeyAction::Cancel,
        (mode, KeyCode::Char('r') | KeyCode::Esc) if mode.is_settled() => KeyAction::Reset,
        _ => KeyAction::Nothing,
    }
}
