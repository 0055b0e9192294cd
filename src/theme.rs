//! Colors used by the browser widgets.
//!
//! Named ANSI colors only, so the palette follows the user's terminal scheme.

use ratatui::style::Color;

/// All runtime colors used in the UI.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub header_fg: Color,
    pub caret_fg: Color,
    pub dir_fg: Color,
    pub file_fg: Color,
    pub border_fg: Color,
    pub preview_fg: Color,
    pub hints_fg: Color,
    pub status_fg: Color,
    pub error_fg: Color,
    /// Background behind the permission-denied sentinel.
    pub denied_bg: Color,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            header_fg: Color::Reset,
            caret_fg: Color::Reset,
            dir_fg: Color::Blue,
            file_fg: Color::Reset,
            border_fg: Color::Reset,
            preview_fg: Color::Reset,
            hints_fg: Color::Cyan,
            status_fg: Color::Yellow,
            error_fg: Color::Red,
            denied_bg: Color::Red,
        }
    }
}
