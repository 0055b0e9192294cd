use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::event::Event;
use crate::viewport::Direction;

/// Footer hints for the bindings recognized by [`translate_key`].
pub const KEY_HINTS: [&str; 4] = ["↑/↓ move", "→/enter open", "a hidden", "q quit"];

/// Translate a raw terminal event into a browser event.
///
/// Returns `None` for anything the browser ignores.
pub fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) => translate_key(key),
        CrosstermEvent::Resize(_, _) => Some(Event::Resize),
        _ => None,
    }
}

/// Map a key press onto a browser event.
pub fn translate_key(key: KeyEvent) -> Option<Event> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Up => Some(Event::Reselect(Direction::Up)),
        KeyCode::Down => Some(Event::Reselect(Direction::Down)),
        KeyCode::Right | KeyCode::Enter => Some(Event::Select),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Event::Quit),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Event::Quit),
        KeyCode::Char('a') | KeyCode::Char('A') => Some(Event::ToggleHidden),
        _ => None,
    }
}
