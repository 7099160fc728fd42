//! Event Loop - TUI entry point and key handling

use super::render::draw_ui;
use super::state::{key_action, KeyAction, ScreenModel};
use crate::config::HermitConfig;
use crate::host::{build_session, HostSession, PayloadSlot};
use crate::interaction::Payload;
use anyhow::{anyhow, Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use hermit_common::{CaptureAdapter, DeliveryReceiver};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing::info;

const INPUT_POLL: Duration = Duration::from_millis(100);

/// Run the TUI until the operator quits. Returns the payload held at exit.
pub async fn run<A: CaptureAdapter>(config: &HermitConfig, adapter: A) -> Result<Option<Payload>> {
    let (mut session, mut rx, slot) = build_session(config, adapter);

    // Configuration errors must surface before the terminal is taken over
    session
        .instructions()
        .map_err(|e| anyhow!(e))
        .context("Cannot show the Hermit command")?;

    enable_raw_mode().map_err(|e| {
        anyhow!("Failed to enable raw mode: {}. Ensure you're running in a real terminal (TTY).", e)
    })?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| {
        let _ = disable_raw_mode();
        anyhow!("Failed to initialize terminal: {}", e)
    })?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, &mut session, &mut rx, &slot).await;

    // Restore terminal (always attempt cleanup)
    let cleanup_result = restore_terminal(&mut terminal);

    // Release the camera before handing the payload back
    session.cancel();
    info!(session = %session.id(), "TUI closed in {} mode", session.mode());

    result.and(cleanup_result).map(|_| slot.get())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_event_loop<A: CaptureAdapter>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut HostSession<A>,
    rx: &mut DeliveryReceiver,
    slot: &PayloadSlot,
) -> Result<()> {
    let mut show_help = false;

    loop {
        // Capture events first so the frame reflects them
        session.drain(rx);

        let model = ScreenModel::capture(session, slot, show_help)
            .map_err(|e| anyhow!(e))
            .context("Cannot show the Hermit command")?;
        terminal.draw(|f| draw_ui(f, &model))?;

        if !event::poll(INPUT_POLL)? {
            tokio::task::yield_now().await;
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key_action(session.mode(), key) {
            KeyAction::Start => {
                session.start();
            }
            KeyAction::Cancel => {
                session.cancel();
            }
            KeyAction::Reset => {
                session.reset();
            }
            KeyAction::ToggleHelp => show_help = !show_help,
            KeyAction::Quit => break,
            KeyAction::Nothing => {}
        }
    }

    Ok(())
}
