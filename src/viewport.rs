//! Scrollable selection window over a line list, with a header, a footer of
//! key hints and a side preview pane.
//!
//! Every size-dependent value is derived from the live terminal size on each
//! query.

use ratatui::{
    backend::Backend,
    layout::{Rect, Size},
    style::Style,
    text::{Line, Span},
    Frame, Terminal,
};

use crate::components::key_hints::KeyHintsWidget;
use crate::components::listing::{ListingWidget, NAME_X};
use crate::components::preview::PreviewWidget;
use crate::error::{AppError, Result};
use crate::theme::ThemeColors;

/// Rows above the listing (the header).
const HEADER_ROWS: u16 = 1;
/// Rows below the listing (the key hints footer).
const FOOTER_ROWS: u16 = 1;
/// Column where the footer text starts.
const FOOTER_X: u16 = 1;

/// One step of selection movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn delta(self) -> isize {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

/// Screen regions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameLayout {
    header: Rect,
    listing: Rect,
    footer: Rect,
    preview: Rect,
}

impl FrameLayout {
    fn new(size: Size) -> Self {
        let (width, height) = (size.width, size.height);
        let split = split_column(width);
        let body_rows = height.saturating_sub(HEADER_ROWS + FOOTER_ROWS);
        Self {
            header: Rect::new(0, 0, split, height.min(HEADER_ROWS)),
            listing: Rect::new(0, HEADER_ROWS.min(height), split, body_rows),
            footer: Rect::new(
                FOOTER_X.min(width),
                height.saturating_sub(FOOTER_ROWS),
                width.saturating_sub(FOOTER_X),
                height.min(FOOTER_ROWS),
            ),
            // One blank column either side of the box and the footer row below.
            preview: Rect::new(
                (split + 1).min(width),
                HEADER_ROWS.min(height),
                width.saturating_sub(split + 2),
                body_rows,
            ),
        }
    }
}

/// The left pane ends at half the terminal width.
fn split_column(width: u16) -> u16 {
    width / 2
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    is_error: bool,
}

/// Viewer state plus the terminal it is drawn on.
///
/// Invariant, re-established on every selection change and every render:
/// `scroll_offset <= selected_index < scroll_offset + visible_rows`.
pub struct Viewport<B: Backend> {
    terminal: Terminal<B>,
    theme: ThemeColors,
    key_hints: Vec<String>,
    header: String,
    lines: Vec<String>,
    selected_index: usize,
    scroll_offset: usize,
    preview: Vec<String>,
    status: Option<StatusMessage>,
}

impl<B: Backend> Viewport<B> {
    pub fn new(terminal: Terminal<B>, key_hints: Vec<String>) -> Self {
        Self {
            terminal,
            theme: ThemeColors::default(),
            key_hints,
            header: String::new(),
            lines: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
            preview: Vec::new(),
            status: None,
        }
    }

    /// Replace the content and reset selection and scroll. Does not draw.
    pub fn init(&mut self, header: String, lines: Vec<String>) {
        self.header = header;
        self.lines = lines;
        self.selected_index = 0;
        self.scroll_offset = 0;
    }

    /// [`Viewport::init`] followed by [`Viewport::render`].
    pub fn display(
        &mut self,
        header: String,
        lines: Vec<String>,
        preview: Vec<String>,
    ) -> Result<()> {
        self.init(header, lines);
        self.render(preview)
    }

    /// Move the selection one row. Out-of-range moves are ignored.
    ///
    /// The scroll offset follows by exactly one row when the selection leaves
    /// the window; selection only ever moves one row at a time.
    pub fn move_selection(&mut self, direction: Direction) -> Result<()> {
        let Some(new_index) = self.selected_index.checked_add_signed(direction.delta()) else {
            return Ok(());
        };
        if new_index >= self.lines.len() {
            return Ok(());
        }
        let visible = self.visible_rows()?;
        self.selected_index = new_index;
        if new_index < self.scroll_offset {
            self.scroll_offset -= 1;
        } else if new_index >= self.scroll_offset + visible {
            self.scroll_offset += 1;
        }
        Ok(())
    }

    /// Store `preview` and draw a full frame.
    pub fn render(&mut self, preview: Vec<String>) -> Result<()> {
        self.preview = preview;
        self.redraw()
    }

    /// Draw a full frame from the current state.
    pub fn redraw(&mut self) -> Result<()> {
        let visible = self.visible_rows()?;
        self.reconcile_scroll(visible);

        let Self {
            terminal,
            theme,
            key_hints,
            header,
            lines,
            selected_index,
            scroll_offset,
            preview,
            status,
        } = self;

        terminal
            .draw(|frame| {
                let area = frame.area();
                let layout = FrameLayout::new(Size {
                    width: area.width,
                    height: area.height,
                });
                draw_header(frame, layout.header, header, theme);
                frame.render_widget(
                    ListingWidget::new(lines, *selected_index, *scroll_offset, theme),
                    layout.listing,
                );
                let mut footer = KeyHintsWidget::new(key_hints, theme);
                if let Some(msg) = status.as_ref() {
                    footer = footer.status_message(&msg.text, msg.is_error);
                }
                frame.render_widget(footer, layout.footer);
                frame.render_widget(PreviewWidget::new(preview, theme), layout.preview);
            })
            .map_err(|e| AppError::Terminal(e.to_string()))?;
        Ok(())
    }

    /// Force the next draw to repaint every cell.
    pub fn clear(&mut self) -> Result<()> {
        self.terminal
            .clear()
            .map_err(|e| AppError::Terminal(e.to_string()))
    }

    /// Show `text` in the footer instead of the key hints until cleared.
    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error,
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// The highlighted line, if there is any content.
    #[allow(dead_code)]
    pub fn current_selected(&self) -> Option<&str> {
        self.lines.get(self.selected_index).map(String::as_str)
    }

    /// Rows available inside the preview box.
    pub fn preview_height(&self) -> Result<usize> {
        let layout = FrameLayout::new(self.size()?);
        Ok(layout.preview.height.saturating_sub(2) as usize)
    }

    /// `(columns, rows)` available to entry names in the listing pane.
    pub fn text_view_size(&self) -> Result<(usize, usize)> {
        let layout = FrameLayout::new(self.size()?);
        Ok((
            layout.listing.width.saturating_sub(NAME_X) as usize,
            layout.listing.height as usize,
        ))
    }

    pub fn visible_rows(&self) -> Result<usize> {
        Ok(self.text_view_size()?.1)
    }

    #[cfg(test)]
    pub fn header(&self) -> &str {
        &self.header
    }

    #[cfg(test)]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    #[cfg(test)]
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    #[cfg(test)]
    pub fn preview(&self) -> &[String] {
        &self.preview
    }

    #[cfg(test)]
    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    #[cfg(test)]
    pub fn backend_mut(&mut self) -> &mut B {
        self.terminal.backend_mut()
    }

    fn size(&self) -> Result<Size> {
        self.terminal
            .size()
            .map_err(|e| AppError::Terminal(e.to_string()))
    }

    /// Bring the selected row back into a window of `visible` rows, e.g.
    /// after the terminal shrank.
    fn reconcile_scroll(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible {
            self.scroll_offset = self.selected_index + 1 - visible;
        }
    }
}

fn draw_header(frame: &mut Frame, area: Rect, header: &str, theme: &ThemeColors) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let line = Line::from(Span::styled(header, Style::default().fg(theme.header_fg)));
    frame.buffer_mut().set_line(area.x, area.y, &line, area.width);
}
