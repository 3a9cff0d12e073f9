//! Cursor and scroll bookkeeping
//!
//! The viewport is the single authority for converting between the
//! viewport-relative cursor and absolute buffer coordinates:
//!
//! ```text
//! absolute row = cursor_row + scroll_row
//! absolute col = cursor_col + scroll_col
//! ```
//!
//! `width` and `height` are the largest relative column and row the cursor may
//! occupy, so the visible text area is `width + 1` columns by `height + 1` rows.
//! Whenever a motion would take the cursor outside that window the cursor pins
//! to the edge and the scroll offset absorbs the overflow ("soft scroll").

use crate::model::buffer::{Position, TextBuffer};
use std::ops::Range;

/// Columns taken by the gutter (marker + padding) left of the text
pub const GUTTER_WIDTH: u16 = 2;

/// Rows taken by the status bar below the text
pub const STATUS_BAR_HEIGHT: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    /// Cursor row relative to the top of the window
    pub cursor_row: usize,

    /// Cursor column relative to the left edge of the window
    pub cursor_col: usize,

    /// Absolute row shown at the top of the window
    pub scroll_row: usize,

    /// Absolute column shown at the left edge of the window
    pub scroll_col: usize,

    /// Largest relative cursor column
    pub width: usize,

    /// Largest relative cursor row
    pub height: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cursor_row: 0,
            cursor_col: 0,
            scroll_row: 0,
            scroll_col: 0,
            width,
            height,
        }
    }

    /// Viewport dimensions for a terminal of `cols` x `rows` cells
    pub fn dimensions_for_terminal(cols: u16, rows: u16) -> (usize, usize) {
        (
            cols.saturating_sub(GUTTER_WIDTH + 1) as usize,
            rows.saturating_sub(STATUS_BAR_HEIGHT + 1) as usize,
        )
    }

    /// Create a viewport sized for a terminal of `cols` x `rows` cells
    pub fn for_terminal(cols: u16, rows: u16) -> Self {
        let (width, height) = Self::dimensions_for_terminal(cols, rows);
        Self::new(width, height)
    }

    /// Absolute cursor position
    pub fn to_absolute(&self) -> Position {
        Position::new(
            self.cursor_row + self.scroll_row,
            self.cursor_col + self.scroll_col,
        )
    }

    /// Absolute rows currently on screen
    pub fn visible_rows(&self) -> Range<usize> {
        self.scroll_row..self.scroll_row + self.height + 1
    }

    /// Absolute columns currently on screen
    pub fn visible_cols(&self) -> Range<usize> {
        self.scroll_col..self.scroll_col + self.width + 1
    }

    pub fn is_visible(&self, pos: Position) -> bool {
        self.visible_rows().contains(&pos.row) && self.visible_cols().contains(&pos.col)
    }

    /// Put the cursor on absolute `row`, scrolling only by the overflow
    pub fn set_row(&mut self, row: usize) {
        if row < self.scroll_row {
            self.scroll_row = row;
            self.cursor_row = 0;
        } else if row > self.scroll_row + self.height {
            self.scroll_row = row - self.height;
            self.cursor_row = self.height;
        } else {
            self.cursor_row = row - self.scroll_row;
        }
    }

    /// Put the cursor on absolute `col`, scrolling only by the overflow
    pub fn set_column(&mut self, col: usize) {
        if col < self.scroll_col {
            self.scroll_col = col;
            self.cursor_col = 0;
        } else if col > self.scroll_col + self.width {
            self.scroll_col = col - self.width;
            self.cursor_col = self.width;
        } else {
            self.cursor_col = col - self.scroll_col;
        }
    }

    /// Put the cursor at `pos`, scrolling the minimum needed to keep it on screen
    pub fn reveal(&mut self, pos: Position) {
        self.set_row(pos.row);
        self.set_column(pos.col);
    }

    /// Move the cursor by a relative amount.
    ///
    /// Motion is clamped to the document: moving up/left at the start or
    /// down/right at the end does nothing. Vertical motion onto a shorter line
    /// pulls the column back to that line's end. Returns whether the cursor moved.
    pub fn move_cursor(&mut self, delta_row: isize, delta_col: isize, buffer: &TextBuffer) -> bool {
        let start = self.to_absolute();

        if delta_row != 0 {
            let last_row = buffer.line_count().saturating_sub(1);
            let target = start.row.saturating_add_signed(delta_row).min(last_row);
            if target != start.row {
                self.set_row(target);
                self.clamp_to_line(buffer);
            }
        }

        if delta_col != 0 {
            let pos = self.to_absolute();
            let len = buffer.line_len(pos.row);
            let target = pos.col.saturating_add_signed(delta_col).min(len);
            if target != pos.col {
                self.set_column(target);
            }
        }

        self.to_absolute() != start
    }

    /// Snap the column to the end of the current line if the line is shorter.
    ///
    /// The horizontal scroll is recomputed from the line start so as much of
    /// the line as fits stays visible.
    pub fn clamp_to_line(&mut self, buffer: &TextBuffer) {
        let pos = self.to_absolute();
        let len = buffer.line_len(pos.row);
        if pos.col > len {
            self.scroll_col = len.saturating_sub(self.width);
            self.cursor_col = len - self.scroll_col;
        }
    }

    pub fn move_to_line_start(&mut self) {
        self.set_column(0);
    }

    pub fn move_to_line_end(&mut self, buffer: &TextBuffer) {
        let row = self.to_absolute().row;
        self.set_column(buffer.line_len(row));
    }

    /// Move one screenful up (negative) or down (positive)
    pub fn move_pages(&mut self, pages: isize, buffer: &TextBuffer) -> bool {
        let page = (self.height + 1) as isize;
        self.move_cursor(pages.saturating_mul(page), 0, buffer)
    }

    /// Record new dimensions. Scroll state is left alone; the next motion re-clamps.
    pub fn on_resize(&mut self, width: usize, height: usize) {
        tracing::debug!("Viewport resized to {}x{}", width, height);
        self.width = width;
        self.height = height;
    }
}
