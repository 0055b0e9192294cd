use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::fs::listing::is_dir_line;
use crate::theme::ThemeColors;

/// Column of the selection caret, relative to the listing area.
pub const CARET_X: u16 = 1;
/// Column where entry names start, relative to the listing area.
pub const NAME_X: u16 = 3;

const CARET: &str = ">";

/// Directory listing widget: one row per visible entry, starting at
/// `scroll_offset`, with a caret on the selected row.
pub struct ListingWidget<'a> {
    lines: &'a [String],
    selected: usize,
    scroll_offset: usize,
    theme: &'a ThemeColors,
}

impl<'a> ListingWidget<'a> {
    pub fn new(
        lines: &'a [String],
        selected: usize,
        scroll_offset: usize,
        theme: &'a ThemeColors,
    ) -> Self {
        Self {
            lines,
            selected,
            scroll_offset,
            theme,
        }
    }

    fn line_style(&self, line: &str) -> Style {
        if is_dir_line(line) {
            Style::default()
                .fg(self.theme.dir_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.file_fg)
        }
    }
}

impl<'a> Widget for ListingWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width <= NAME_X || area.height == 0 {
            return;
        }

        let visible = self
            .lines
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(area.height as usize);

        for (row, (idx, line)) in visible.enumerate() {
            let y = area.y + row as u16;
            if idx == self.selected {
                let caret = Span::styled(CARET, Style::default().fg(self.theme.caret_fg));
                buf.set_span(area.x + CARET_X, y, &caret, 1);
            }
            let name = Line::from(Span::styled(line.as_str(), self.line_style(line)));
            buf.set_line(area.x + NAME_X, y, &name, area.width - NAME_X);
        }
    }
}
