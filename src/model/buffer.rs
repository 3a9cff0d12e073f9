//! Line-oriented text storage
//!
//! The document is held as one `String` per line and always contains at least
//! one line (an empty document is a single empty line). Columns are counted in
//! `char`s so that no operation can split a code point.
//!
//! Every mutating primitive validates its arguments before touching the lines,
//! so a failed call leaves the buffer exactly as it was.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Absolute position in the buffer (row index, char column)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Bounds violations reported by [`TextBuffer`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("row {row} out of range (buffer has {len} lines)")]
    RowOutOfRange { row: usize, len: usize },

    #[error("columns {start}..{end} out of range for row {row} (length {len})")]
    ColumnOutOfRange {
        row: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("text for row {row} contains a line break")]
    EmbeddedNewline { row: usize },

    #[error("no line below row {row} to merge")]
    NoLineBelow { row: usize },

    #[error("cannot remove the last remaining line")]
    LastLine,

    #[error("range end {end:?} precedes start {start:?}")]
    ReversedRange { start: Position, end: Position },
}

/// Byte offset of the char at `col`, or the line length when `col` is at the end
fn byte_offset(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

/// Ordered sequence of lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    /// Create a buffer holding a single empty line
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    /// Build a buffer from individual lines. Any embedded `\n` starts a new line.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<String> = lines
            .into_iter()
            .flat_map(|line| {
                line.as_ref()
                    .split('\n')
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        if lines.is_empty() {
            Self::new()
        } else {
            Self { lines }
        }
    }

    /// Build a buffer from file contents.
    ///
    /// Line endings may be `\n` or `\r\n`; tabs are expanded to `tab_size` spaces.
    pub fn from_text(text: &str, tab_size: usize) -> Self {
        let indent = " ".repeat(tab_size);
        let lines: Vec<String> = text
            .split('\n')
            .map(|line| {
                line.strip_suffix('\r')
                    .unwrap_or(line)
                    .replace('\t', &indent)
            })
            .collect();
        Self { lines }
    }

    /// The document as written to disk: lines joined with `\n`
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(String::as_str)
    }

    /// Length of `row` in chars (0 for rows past the end)
    pub fn line_len(&self, row: usize) -> usize {
        self.lines
            .get(row)
            .map(|line| line.chars().count())
            .unwrap_or(0)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Position just past the last char of the document
    pub fn end_position(&self) -> Position {
        let row = self.lines.len() - 1;
        Position::new(row, self.line_len(row))
    }

    /// Char at `pos`, if `pos` is not at a line end
    pub fn char_at(&self, pos: Position) -> Option<char> {
        self.lines.get(pos.row)?.chars().nth(pos.col)
    }

    fn check_row(&self, row: usize) -> Result<(), BufferError> {
        if row < self.lines.len() {
            Ok(())
        } else {
            Err(BufferError::RowOutOfRange {
                row,
                len: self.lines.len(),
            })
        }
    }

    fn check_columns(&self, row: usize, start: usize, end: usize) -> Result<(), BufferError> {
        self.check_row(row)?;
        let len = self.line_len(row);
        if start > end || end > len {
            return Err(BufferError::ColumnOutOfRange {
                row,
                start,
                end,
                len,
            });
        }
        Ok(())
    }

    fn check_position(&self, pos: Position) -> Result<(), BufferError> {
        self.check_columns(pos.row, pos.col, pos.col)
    }

    /// Replace chars `col_start..col_end` of `row` with `replacement`.
    ///
    /// Returns the text that was replaced.
    pub fn splice(
        &mut self,
        row: usize,
        col_start: usize,
        col_end: usize,
        replacement: &str,
    ) -> Result<String, BufferError> {
        self.check_columns(row, col_start, col_end)?;
        if replacement.contains('\n') {
            return Err(BufferError::EmbeddedNewline { row });
        }

        let line = &mut self.lines[row];
        let start = byte_offset(line, col_start);
        let end = byte_offset(line, col_end);
        let removed = line[start..end].to_string();
        line.replace_range(start..end, replacement);
        Ok(removed)
    }

    /// Break `row` at `col`; the tail becomes a new line directly below
    pub fn split_line(&mut self, row: usize, col: usize) -> Result<(), BufferError> {
        self.check_columns(row, col, col)?;
        let line = &mut self.lines[row];
        let tail = line.split_off(byte_offset(line, col));
        self.lines.insert(row + 1, tail);
        Ok(())
    }

    /// Append line `row + 1` onto `row` and remove it.
    ///
    /// Returns the join column (the length of `row` before the merge).
    pub fn merge_lines(&mut self, row: usize) -> Result<usize, BufferError> {
        self.check_row(row)?;
        if row + 1 >= self.lines.len() {
            return Err(BufferError::NoLineBelow { row });
        }
        let join_col = self.line_len(row);
        let next = self.lines.remove(row + 1);
        self.lines[row].push_str(&next);
        Ok(join_col)
    }

    /// Insert a whole line so that it becomes line `row` (`row == line_count()` appends)
    pub fn insert_line(&mut self, row: usize, content: &str) -> Result<(), BufferError> {
        if row > self.lines.len() {
            return Err(BufferError::RowOutOfRange {
                row,
                len: self.lines.len(),
            });
        }
        if content.contains('\n') {
            return Err(BufferError::EmbeddedNewline { row });
        }
        self.lines.insert(row, content.to_string());
        Ok(())
    }

    /// Remove line `row`, returning its content. The last remaining line cannot be removed.
    pub fn remove_line(&mut self, row: usize) -> Result<String, BufferError> {
        self.check_row(row)?;
        if self.lines.len() == 1 {
            return Err(BufferError::LastLine);
        }
        Ok(self.lines.remove(row))
    }

    /// Where `text` would end if it were inserted at `start`
    pub fn text_end(start: Position, text: &str) -> Position {
        match text.rsplit_once('\n') {
            Some((head, last)) => Position::new(
                start.row + head.matches('\n').count() + 1,
                last.chars().count(),
            ),
            None => Position::new(start.row, start.col + text.chars().count()),
        }
    }

    /// Insert possibly multi-line `text` at `at`, returning the position just after it.
    ///
    /// The first segment joins the prefix of the current line, middle segments
    /// become whole lines, and the last segment is prepended to the old suffix.
    pub fn insert_text(&mut self, at: Position, text: &str) -> Result<Position, BufferError> {
        self.check_position(at)?;

        let segments: Vec<&str> = text.split('\n').collect();
        let last_index = segments.len() - 1;
        if last_index == 0 {
            self.splice(at.row, at.col, at.col, text)?;
            return Ok(Self::text_end(at, text));
        }

        self.split_line(at.row, at.col)?;
        self.splice(at.row, at.col, at.col, segments[0])?;
        for (offset, segment) in segments[1..last_index].iter().enumerate() {
            self.insert_line(at.row + 1 + offset, segment)?;
        }
        let last = segments[last_index];
        let last_row = at.row + last_index;
        self.splice(last_row, 0, 0, last)?;

        Ok(Position::new(last_row, last.chars().count()))
    }

    /// Remove everything between `start` and `end` (possibly across lines) and return it
    pub fn delete_range(&mut self, start: Position, end: Position) -> Result<String, BufferError> {
        if end < start {
            return Err(BufferError::ReversedRange { start, end });
        }
        self.check_position(start)?;
        self.check_position(end)?;

        if start.row == end.row {
            return self.splice(start.row, start.col, end.col, "");
        }

        let start_len = self.line_len(start.row);
        let mut removed = self.splice(start.row, start.col, start_len, "")?;
        for _ in start.row + 1..end.row {
            removed.push('\n');
            removed.push_str(&self.remove_line(start.row + 1)?);
        }
        removed.push('\n');
        removed.push_str(&self.splice(start.row + 1, 0, end.col, "")?);
        self.merge_lines(start.row)?;
        Ok(removed)
    }
}
