use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::error::PERMISSION_DENIED_LINE;
use crate::theme::ThemeColors;

const TAB_WIDTH: usize = 4;

/// Bordered preview box for the highlighted entry.
///
/// Lines and columns that don't fit inside the border are clipped.
pub struct PreviewWidget<'a> {
    lines: &'a [String],
    theme: &'a ThemeColors,
}

impl<'a> PreviewWidget<'a> {
    pub fn new(lines: &'a [String], theme: &'a ThemeColors) -> Self {
        Self { lines, theme }
    }

    fn line_style(&self, line: &str) -> Style {
        let style = Style::default().fg(self.theme.preview_fg);
        if line == PERMISSION_DENIED_LINE {
            style.bg(self.theme.denied_bg)
        } else {
            style
        }
    }
}

impl<'a> Widget for PreviewWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 2 || area.height < 2 {
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_fg));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        for (i, text) in self.lines.iter().take(inner.height as usize).enumerate() {
            let y = inner.y + i as u16;
            let expanded = text.replace('\t', &" ".repeat(TAB_WIDTH));
            let line = Line::from(Span::styled(expanded, self.line_style(text)));
            buf.set_line(inner.x, y, &line, inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16, width: u16) -> String {
        (0..width)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn test_draws_border_and_content() {
        let lines = vec!["line 1".to_string(), "line 2".to_string()];
        let theme = ThemeColors::default();
        let area = Rect::new(0, 0, 12, 4);
        let mut buf = Buffer::empty(area);
        PreviewWidget::new(&lines, &theme).render(area, &mut buf);

        assert_eq!(row(&buf, 0, 12), "┌──────────┐");
        assert_eq!(row(&buf, 1, 12), "│line 1    │");
        assert_eq!(row(&buf, 2, 12), "│line 2    │");
        assert_eq!(row(&buf, 3, 12), "└──────────┘");
    }

    #[test]
    fn test_clips_rows_and_columns() {
        let lines: Vec<String> = (0..10).map(|i| format!("row number {i}")).collect();
        let theme = ThemeColors::default();
        let area = Rect::new(0, 0, 8, 4);
        let mut buf = Buffer::empty(area);
        PreviewWidget::new(&lines, &theme).render(area, &mut buf);

        assert_eq!(row(&buf, 1, 8), "│row nu│");
        assert_eq!(row(&buf, 2, 8), "│row nu│");
        assert_eq!(row(&buf, 3, 8), "└──────┘");
    }

    #[test]
    fn test_permission_denied_highlighted() {
        let lines = vec![PERMISSION_DENIED_LINE.to_string()];
        let theme = ThemeColors::default();
        let area = Rect::new(0, 0, 24, 3);
        let mut buf = Buffer::empty(area);
        PreviewWidget::new(&lines, &theme).render(area, &mut buf);

        assert_eq!(buf.cell((1, 1)).unwrap().bg, theme.denied_bg);
    }

    #[test]
    fn test_tabs_are_expanded() {
        let lines = vec!["\tx".to_string()];
        let theme = ThemeColors::default();
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        PreviewWidget::new(&lines, &theme).render(area, &mut buf);

        assert_eq!(row(&buf, 1, 10), "│    x   │");
    }

    #[test]
    fn test_zero_area_no_panic() {
        let lines = vec!["x".to_string()];
        let theme = ThemeColors::default();
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        PreviewWidget::new(&lines, &theme).render(area, &mut buf);
    }
}
