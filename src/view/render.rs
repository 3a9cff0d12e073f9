//! Frame rendering: gutter, text area and status bar

use crate::primitives::display_width::{char_width, span_width};
use crate::primitives::highlighter::{HighlightCategory, Highlighter};
use crate::state::EditorState;
use crate::view::theme::Theme;
use crate::view::viewport::{GUTTER_WIDTH, STATUS_BAR_HEIGHT};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Marker drawn in the gutter on the cursor row
pub const CURSOR_MARKER: char = '>';

/// Lines above the viewport parsed along with it, so constructs opened off
/// screen are still recognised
const HIGHLIGHT_CONTEXT_LINES: usize = 100;

/// What the status bar shows besides the cursor position
#[derive(Debug, Clone, Copy)]
pub struct StatusLine<'a> {
    pub file_name: &'a str,
    pub modified: bool,
    pub message: Option<&'a str>,
}

pub struct EditorRenderer<'a> {
    pub theme: &'a Theme,
    /// None disables syntax colouring
    pub highlighter: Option<&'a Highlighter>,
}

impl EditorRenderer<'_> {
    pub fn render(&self, frame: &mut Frame, state: &EditorState, status: StatusLine<'_>) {
        let area = frame.area();
        let text_height = area.height.saturating_sub(STATUS_BAR_HEIGHT);
        let text_area = Rect::new(area.x, area.y, area.width, text_height);
        let status_area = Rect::new(
            area.x,
            area.y + text_height,
            area.width,
            area.height - text_height,
        );

        self.render_text(frame, text_area, state);
        self.render_status_bar(frame, status_area, state, status);

        if text_area.width > GUTTER_WIDTH && text_area.height > 0 {
            let vp = &state.viewport;
            let cursor = state.cursor();
            let line = state.buffer.line(cursor.row).unwrap_or_default();
            // Wide chars left of the cursor push it further right than its column
            let cells = span_width(line, vp.scroll_col, cursor.col);
            let max_x = text_area.width - 1;
            let max_y = text_area.height - 1;
            let x = (GUTTER_WIDTH as usize + cells).min(max_x as usize) as u16;
            let y = vp.cursor_row.min(max_y as usize) as u16;
            frame.set_cursor_position((text_area.x + x, text_area.y + y));
        }
    }

    fn render_text(&self, frame: &mut Frame, area: Rect, state: &EditorState) {
        let vp = &state.viewport;
        let lines = state.buffer.lines();
        let text_cols = area.width.saturating_sub(GUTTER_WIDTH) as usize;
        let marker_style = Style::default().fg(self.theme.gutter_marker_fg);

        let first_row = vp.scroll_row.min(lines.len());
        let end_row = (vp.scroll_row + area.height as usize).min(lines.len());
        let context_row = first_row.saturating_sub(HIGHLIGHT_CONTEXT_LINES);
        let categories = self
            .highlighter
            .map(|h| h.highlight_lines(&lines[context_row..end_row]))
            .unwrap_or_default();

        let buf = frame.buffer_mut();
        for y in 0..area.height {
            let row = vp.scroll_row + y as usize;
            let Some(line) = lines.get(row) else {
                break;
            };
            let screen_y = area.y + y;
            let line_categories = categories.get(row - context_row);

            if y as usize == vp.cursor_row {
                if let Some(cell) = buf.cell_mut((area.x, screen_y)) {
                    cell.set_char(CURSOR_MARKER).set_style(marker_style);
                }
            }

            let mut used = 0;
            for (col, ch) in line.chars().enumerate().skip(vp.scroll_col) {
                let width = char_width(ch);
                if used + width > text_cols {
                    break;
                }
                let category = line_categories
                    .and_then(|cats| cats.get(col))
                    .copied()
                    .unwrap_or(HighlightCategory::Normal);
                let shown = if ch.is_control() { '?' } else { ch };
                let x = area.x + GUTTER_WIDTH + used as u16;
                if let Some(cell) = buf.cell_mut((x, screen_y)) {
                    cell.set_char(shown).set_fg(self.theme.color_for(category));
                }
                used += width;
            }
        }
    }

    fn render_status_bar(
        &self,
        frame: &mut Frame,
        area: Rect,
        state: &EditorState,
        status: StatusLine<'_>,
    ) {
        if area.height == 0 {
            return;
        }
        let base_style = Style::default()
            .fg(self.theme.status_bar_fg)
            .bg(self.theme.status_bar_bg);
        let cursor = state.cursor();

        let mut spans = vec![Span::styled(format!(" {}", status.file_name), base_style)];
        if status.modified {
            spans.push(Span::styled(
                " [+]",
                base_style
                    .fg(self.theme.status_modified_fg)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        spans.push(Span::styled(
            format!(" | Ln {}, Col {}", cursor.row + 1, cursor.col + 1),
            base_style,
        ));
        if let Some(message) = status.message {
            spans.push(Span::styled(format!(" | {message}"), base_style));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)).style(base_style), area);
    }
}
