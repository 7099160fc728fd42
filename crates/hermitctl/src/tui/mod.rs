//! TUI Module
//!
//! - event_loop: entry point and key handling
//! - render: drawing, one view per scan mode
//! - state: screen model and key mapping

mod event_loop;
mod render;
mod state;

pub use event_loop::run;
pub use render::capture_columns;
pub use state::{key_action, KeyAction, ScreenModel};
