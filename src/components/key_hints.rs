use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

const SEPARATOR: &str = ", ";

/// Join as many leading hints as fit strictly within `width` columns.
///
/// Hints that don't fit are dropped whole, along with everything after them.
pub fn fit_key_hints<S: AsRef<str>>(hints: &[S], width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for hint in hints {
        let hint = hint.as_ref();
        let sep = if out.is_empty() { 0 } else { SEPARATOR.len() };
        let needed = used + sep + Span::raw(hint).width();
        if needed >= width {
            break;
        }
        if sep > 0 {
            out.push_str(SEPARATOR);
        }
        out.push_str(hint);
        used = needed;
    }
    out
}

/// Footer strip: either the available key bindings or a one-off status message.
pub struct KeyHintsWidget<'a> {
    hints: &'a [String],
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    is_error: bool,
}

impl<'a> KeyHintsWidget<'a> {
    pub fn new(hints: &'a [String], theme: &'a ThemeColors) -> Self {
        Self {
            hints,
            theme,
            status_message: None,
            is_error: false,
        }
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }
}

impl<'a> Widget for KeyHintsWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                Style::default()
                    .fg(self.theme.error_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.status_fg)
            };
            let line = Line::from(Span::styled(msg, style));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let text = fit_key_hints(self.hints, area.width as usize);
        let line = Line::from(Span::styled(text, Style::default().fg(self.theme.hints_fg)));
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
