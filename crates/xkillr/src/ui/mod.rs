use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::app::App;
use crate::signals::KillOutcome;

pub mod aux_views;
pub mod listing;
pub mod table;

/// Rows at the bottom of the terminal reserved for the filter prompt.
pub const PROMPT_ROWS: u16 = 1;

/// The narrow surface the interactive loop drives.
pub trait Screen {
    /// Rows available to the table, header included.
    fn viewport_height(&self) -> Result<usize>;
    fn draw(&mut self, app: &App) -> Result<()>;
    /// Waits at most `timeout` for one input event.
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
    fn show_outcome(&mut self, app: &App, outcome: &KillOutcome) -> Result<()>;
    /// Blocks until a key is pressed.
    fn wait_for_key(&mut self) -> Result<()>;
}

/// Raw-mode alternate screen on stdout; restored when dropped.
pub struct TerminalScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalScreen {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen, Hide) {
            restore();
            return Err(err.into());
        }
        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(err) => {
                restore();
                return Err(err.into());
            }
        };
        Ok(Self { terminal })
    }
}

impl Screen for TerminalScreen {
    fn viewport_height(&self) -> Result<usize> {
        let area = self.terminal.size()?;
        Ok(area.height.saturating_sub(PROMPT_ROWS) as usize)
    }

    fn draw(&mut self, app: &App) -> Result<()> {
        self.terminal.draw(|frame| table::render(frame, app))?;
        Ok(())
    }

    fn poll_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    fn show_outcome(&mut self, app: &App, outcome: &KillOutcome) -> Result<()> {
        self.terminal
            .draw(|frame| aux_views::render_outcome(frame, app, outcome))?;
        Ok(())
    }

    fn wait_for_key(&mut self) -> Result<()> {
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(());
                }
            }
        }
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        restore();
    }
}

fn restore() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}

/// One table line, shared by the interactive view and `--list`.
pub fn format_row(user: &str, pid: &str, command: &str) -> String {
    format!("{user:<8} {pid:<8} {command}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_columns_are_padded_to_eight() {
        assert_eq!(format_row("USER", "PID", "COMMAND"), "USER     PID      COMMAND");
    }

    #[test]
    fn long_columns_push_the_rest_right() {
        assert_eq!(
            format_row("systemd-network", "4194304", "networkd"),
            "systemd-network 4194304  networkd"
        );
    }
}
