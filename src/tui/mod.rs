//! Terminal UI for the bughouse client

pub mod command;
pub mod surface;
pub mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;
use surface::TerminalSurface;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The crossterm-backed terminal the client draws on.
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// What a key press asks the client loop to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Only the input line changed.
    Edited,
    /// Enter was pressed on this line.
    Submit(String),
    /// Leave the client.
    Quit,
    /// Key not handled.
    Ignored,
}

/// Applies one key press to the input line.
pub fn handle_key(surface: &mut TerminalSurface, key: KeyEvent) -> KeyOutcome {
    if key.kind != KeyEventKind::Press {
        return KeyOutcome::Ignored;
    }
    match key.code {
        KeyCode::Esc => KeyOutcome::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyOutcome::Quit,
        KeyCode::Enter => KeyOutcome::Submit(surface.take_input()),
        KeyCode::Backspace => {
            surface.backspace();
            KeyOutcome::Edited
        }
        KeyCode::Char(c) => {
            surface.push_char(c);
            KeyOutcome::Edited
        }
        _ => KeyOutcome::Ignored,
    }
}

/// Enters raw mode and the alternate screen.
pub fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    info!("Terminal initialized");
    Ok(terminal)
}

/// Leaves the alternate screen and restores the cursor.
pub fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("Terminal restored");
    Ok(())
}

/// Reads key events on a blocking thread and forwards them.
///
/// The thread stops once the receiver is dropped.
pub fn spawn_key_reader() -> mpsc::UnboundedReceiver<KeyEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => {
                        if tx.send(key).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Failed to read terminal event");
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "Failed to poll terminal events");
                    break;
                }
            }
        }
        debug!("Key reader stopped");
    });
    rx
}
