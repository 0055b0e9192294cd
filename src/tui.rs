use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::error::{AppError, Result};

/// Scoped ownership of the terminal's raw mode and alternate screen.
///
/// The terminal is restored on [`Tui::restore`] or, failing that, on drop.
pub struct Tui {
    active: bool,
}

impl Tui {
    /// Enter raw mode and the alternate screen.
    pub fn new() -> Result<Self> {
        enter()?;
        Ok(Self { active: true })
    }

    /// A ratatui terminal drawing on stdout.
    pub fn terminal(&self) -> Result<Terminal<CrosstermBackend<Stdout>>> {
        Terminal::new(CrosstermBackend::new(io::stdout()))
            .map_err(|e| AppError::Terminal(e.to_string()))
    }

    /// Hand the terminal to a child process.
    pub fn suspend(&mut self) -> Result<()> {
        if self.active {
            leave()?;
            self.active = false;
        }
        Ok(())
    }

    /// Take the terminal back after [`Tui::suspend`].
    pub fn resume(&mut self) -> Result<()> {
        if !self.active {
            enter()?;
            self.active = true;
        }
        Ok(())
    }

    /// Restore the terminal to its original state.
    pub fn restore(&mut self) -> Result<()> {
        self.suspend()
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if self.active {
            let _ = leave();
        }
    }
}

fn enter() -> Result<()> {
    terminal::enable_raw_mode().map_err(|e| AppError::Terminal(e.to_string()))?;
    execute!(io::stdout(), EnterAlternateScreen, crossterm::cursor::Hide)
        .map_err(|e| AppError::Terminal(e.to_string()))?;
    Ok(())
}

fn leave() -> Result<()> {
    terminal::disable_raw_mode().map_err(|e| AppError::Terminal(e.to_string()))?;
    execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show)
        .map_err(|e| AppError::Terminal(e.to_string()))?;
    Ok(())
}

/// Install a panic hook that restores the terminal before printing panic info.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
        original_hook(panic_info);
    }));
}
